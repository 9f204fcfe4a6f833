//! Initial database migration.
//!
//! Creates users, accounts, the append-only transactions ledger and the
//! per-day sent and received aggregates.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: USERS & ACCOUNTS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(DAILY_TOTALS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(IMMUTABLE_LEDGER_SQL).await?;

        // ============================================================
        // PART 5: INDEXES
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM ('normal', 'admin');

-- Ledger entry status
CREATE TYPE transfer_status AS ENUM ('completed');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'normal',
    failed_attempts INTEGER NOT NULL DEFAULT 0,
    blocked BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_failed_attempts_non_negative CHECK (failed_attempts >= 0)
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    sender_account_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    receiver_account_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    amount NUMERIC(19, 2) NOT NULL,
    concept TEXT NOT NULL DEFAULT '',
    status transfer_status NOT NULL DEFAULT 'completed',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_distinct_parties CHECK (sender_account_id <> receiver_account_id)
);
";

const DAILY_TOTALS_SQL: &str = r"
CREATE TABLE daily_sent_totals (
    id BIGSERIAL PRIMARY KEY,
    account_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    day DATE NOT NULL,
    amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_daily_sent_account_day UNIQUE (account_id, day),
    CONSTRAINT chk_daily_sent_non_negative CHECK (amount >= 0)
);

CREATE TABLE daily_received_totals (
    id BIGSERIAL PRIMARY KEY,
    account_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    day DATE NOT NULL,
    amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_daily_received_account_day UNIQUE (account_id, day),
    CONSTRAINT chk_daily_received_non_negative CHECK (amount >= 0)
);
";

const IMMUTABLE_LEDGER_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_ledger_modification
-- Ledger entries are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_ledger_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Ledger entries are immutable (% on transaction %)', TG_OP, OLD.id;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_ledger_mod
BEFORE UPDATE OR DELETE ON transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_ledger_modification();
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_transactions_sender ON transactions(sender_account_id, created_at DESC);
CREATE INDEX idx_transactions_receiver ON transactions(receiver_account_id, created_at DESC);
";

const DROP_ALL_SQL: &str = r"
-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_ledger_mod ON transactions;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_ledger_modification();

-- Drop tables
DROP TABLE IF EXISTS daily_received_totals CASCADE;
DROP TABLE IF EXISTS daily_sent_totals CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS users CASCADE;

-- Drop enums
DROP TYPE IF EXISTS transfer_status;
DROP TYPE IF EXISTS user_role;
";
