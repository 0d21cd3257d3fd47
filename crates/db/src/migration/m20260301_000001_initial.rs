//! Initial database migration.
//!
//! Creates the cooperative ledger schema: enums, chart of accounts, journal
//! tables, and the operational tables that post into the journal.

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
        // PART 2: TENANTS
        // ============================================================
        db.execute_unprepared(COOPERATIVES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 5: MEMBERS & INVENTORY
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 6: BUSINESS EVENTS
        // ============================================================
        db.execute_unprepared(SALES_SQL).await?;
        db.execute_unprepared(SALE_ITEMS_SQL).await?;
        db.execute_unprepared(DEPOSITS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Side on which an account's balance grows
CREATE TYPE normal_side AS ENUM ('debit', 'credit');

-- Business event a journal entry was posted from
CREATE TYPE journal_category AS ENUM ('sale', 'deposit', 'manual', 'reversal');

-- Member capital categories
CREATE TYPE deposit_category AS ENUM ('principal', 'mandatory', 'voluntary');

-- Sale payment methods
CREATE TYPE payment_method AS ENUM ('cash');
";

const COOPERATIVES_SQL: &str = r"
CREATE TABLE cooperatives (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES cooperatives(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    normal_side normal_side NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT chk_accounts_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

-- Codes are unique per tenant among live accounts
CREATE UNIQUE INDEX uq_accounts_code ON accounts(tenant_id, code) WHERE deleted_at IS NULL;

CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES cooperatives(id) ON DELETE CASCADE,
    journal_number VARCHAR(32) NOT NULL,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference VARCHAR(100),
    category journal_category NOT NULL,
    total_debit NUMERIC(18, 2) NOT NULL,
    total_credit NUMERIC(18, 2) NOT NULL,
    is_balanced BOOLEAN NOT NULL,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    -- Soft-deleted entries keep their number so it is never reissued
    CONSTRAINT uq_journal_entries_number UNIQUE (tenant_id, journal_number),
    CONSTRAINT chk_journal_entries_balanced CHECK (
        NOT is_balanced OR abs(total_debit - total_credit) <= 0.01
    )
);

CREATE INDEX idx_journal_entries_date ON journal_entries(tenant_id, entry_date)
    WHERE deleted_at IS NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(18, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(18, 2) NOT NULL DEFAULT 0,
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT chk_journal_lines_one_side CHECK (
        (debit > 0 AND credit = 0) OR (debit = 0 AND credit > 0)
    )
);

CREATE INDEX idx_journal_lines_entry ON journal_lines(journal_entry_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id) WHERE deleted_at IS NULL;
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES cooperatives(id) ON DELETE CASCADE,
    member_number VARCHAR(32) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    joined_on DATE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_members_number UNIQUE (tenant_id, member_number)
);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES cooperatives(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    price NUMERIC(18, 2) NOT NULL,
    purchase_price NUMERIC(18, 2),
    stock INTEGER NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_products_code UNIQUE (tenant_id, code),
    CONSTRAINT chk_products_stock CHECK (stock >= 0),
    CONSTRAINT chk_products_price CHECK (price > 0)
);
";

const SALES_SQL: &str = r"
CREATE TABLE sales (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES cooperatives(id) ON DELETE CASCADE,
    sale_number VARCHAR(32) NOT NULL,
    sale_date DATE NOT NULL,
    member_id UUID REFERENCES members(id),
    total NUMERIC(18, 2) NOT NULL,
    payment_method payment_method NOT NULL DEFAULT 'cash',
    amount_paid NUMERIC(18, 2) NOT NULL,
    change_due NUMERIC(18, 2) NOT NULL DEFAULT 0,
    cashier_id UUID NOT NULL,
    journal_entry_id UUID REFERENCES journal_entries(id),
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_sales_number UNIQUE (tenant_id, sale_number),
    CONSTRAINT chk_sales_paid CHECK (amount_paid >= total)
);
";

const SALE_ITEMS_SQL: &str = r"
CREATE TABLE sale_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    sale_id UUID NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    product_name VARCHAR(255) NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price NUMERIC(18, 2) NOT NULL,
    subtotal NUMERIC(18, 2) NOT NULL,
    -- Purchase price at the time of sale; NULL when unknown
    unit_cost NUMERIC(18, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_sale_items_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_sale_items_sale ON sale_items(sale_id);
";

const DEPOSITS_SQL: &str = r"
CREATE TABLE deposits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES cooperatives(id) ON DELETE CASCADE,
    member_id UUID NOT NULL REFERENCES members(id),
    category deposit_category NOT NULL,
    deposit_date DATE NOT NULL,
    amount NUMERIC(18, 2) NOT NULL,
    reference_number VARCHAR(32) NOT NULL,
    note TEXT,
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_deposits_reference UNIQUE (tenant_id, reference_number),
    CONSTRAINT chk_deposits_amount CHECK (amount > 0)
);

CREATE INDEX idx_deposits_member ON deposits(member_id, deposit_date DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS deposits CASCADE;
DROP TABLE IF EXISTS sale_items CASCADE;
DROP TABLE IF EXISTS sales CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS members CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS cooperatives CASCADE;

DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS deposit_category;
DROP TYPE IF EXISTS journal_category;
DROP TYPE IF EXISTS normal_side;
DROP TYPE IF EXISTS account_type;
";
