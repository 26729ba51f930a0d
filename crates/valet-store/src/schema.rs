//! Database schema definitions.
//!
//! Tables are created idempotently when the store is opened.

/// Table names.
pub mod table {
    /// Singleton slot template.
    pub const SLOT_SETTINGS: &str = "booking_slot_settings";

    /// Valet records.
    pub const VALETS: &str = "valets";

    /// Weekly rotas, one active row per valet.
    pub const VALET_ROTA: &str = "valet_rota";

    /// Customer bookings.
    pub const VALET_BOOKINGS: &str = "valet_bookings";

    /// Per-valet days off.
    pub const VALET_HOLIDAYS: &str = "valet_holidays";

    /// Per-slot overrides. Only touched by valet deletion.
    pub const VALET_SLOT_OVERRIDES: &str = "valet_slot_overrides";
}

/// DDL statements, in dependency order.
pub const MIGRATIONS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS booking_slot_settings (
        setting_id INTEGER PRIMARY KEY,
        slot_start_time TEXT NOT NULL,
        slot_end_time TEXT NOT NULL,
        slot_duration_minutes INTEGER NOT NULL,
        break_start_time TEXT NOT NULL,
        break_end_time TEXT NOT NULL,
        lead_time_hours INTEGER NOT NULL,
        updated_by TEXT,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS valets (
        valet_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS valet_rota (
        rota_id TEXT PRIMARY KEY,
        valet_id TEXT NOT NULL REFERENCES valets(valet_id),
        sunday_available INTEGER NOT NULL DEFAULT 0,
        sunday_capacity INTEGER,
        monday_available INTEGER NOT NULL DEFAULT 0,
        monday_capacity INTEGER,
        tuesday_available INTEGER NOT NULL DEFAULT 0,
        tuesday_capacity INTEGER,
        wednesday_available INTEGER NOT NULL DEFAULT 0,
        wednesday_capacity INTEGER,
        thursday_available INTEGER NOT NULL DEFAULT 0,
        thursday_capacity INTEGER,
        friday_available INTEGER NOT NULL DEFAULT 0,
        friday_capacity INTEGER,
        saturday_available INTEGER NOT NULL DEFAULT 0,
        saturday_capacity INTEGER,
        is_active INTEGER NOT NULL DEFAULT 1,
        updated_by TEXT,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_valet_rota_active ON valet_rota(valet_id, is_active)",
    r"
    CREATE TABLE IF NOT EXISTS valet_bookings (
        booking_id TEXT PRIMARY KEY,
        booking_code TEXT NOT NULL,
        vehicle_make TEXT NOT NULL,
        vehicle_model TEXT NOT NULL,
        vehicle_registration TEXT,
        vehicle_colour TEXT,
        vehicle_condition TEXT NOT NULL,
        customer_name TEXT,
        customer_email TEXT,
        customer_phone TEXT,
        booking_date TEXT NOT NULL,
        booking_time TEXT,
        valet_id TEXT NOT NULL REFERENCES valets(valet_id),
        valet_name TEXT,
        status TEXT NOT NULL,
        paint_protection TEXT NOT NULL,
        special_requirements TEXT,
        notes TEXT,
        key_number TEXT,
        sales_executive_name TEXT,
        source TEXT NOT NULL,
        prep_tracker_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_valet_bookings_valet_date ON valet_bookings(valet_id, booking_date)",
    r"
    CREATE TABLE IF NOT EXISTS valet_holidays (
        valet_id TEXT NOT NULL REFERENCES valets(valet_id),
        holiday_date TEXT NOT NULL,
        PRIMARY KEY (valet_id, holiday_date)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS valet_slot_overrides (
        override_id TEXT PRIMARY KEY,
        valet_id TEXT NOT NULL REFERENCES valets(valet_id),
        override_date TEXT NOT NULL,
        slot_time TEXT,
        capacity INTEGER
    )
    ",
];

/// Tables holding rows that reference a valet, deleted before the valet itself.
pub const VALET_CHILD_TABLES: [&str; 4] = [
    table::VALET_BOOKINGS,
    table::VALET_HOLIDAYS,
    table::VALET_SLOT_OVERRIDES,
    table::VALET_ROTA,
];
