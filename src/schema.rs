/// Column-name constants for the pos-insights tables.
/// Single source of truth - exported to Python via PyO3.

// ── Item (per-product sales) columns ────────────────────────────────────────
pub mod item {
    pub const BRANCH: &str = "local";
    pub const PRODUCT: &str = "producto";
    pub const CATEGORY: &str = "rubro";
    pub const UNITS: &str = "unidades";
    pub const REVENUE: &str = "ventas";
    pub const AVG_PRICE: &str = "precio_promedio";

    /// Columns a loaded branch table carries, in output order.
    pub const ALL: [&str; 5] = [BRANCH, PRODUCT, CATEGORY, UNITS, REVENUE];
    /// Columns without which an item export cannot be analysed.
    pub const REQUIRED: [&str; 3] = [PRODUCT, UNITS, REVENUE];
}

// ── Period (monthly sales by channel) columns ───────────────────────────────
pub mod period {
    pub const BRANCH: &str = "local";
    pub const PERIOD: &str = "mes";
    pub const DINING: &str = "salon";
    pub const COUNTER: &str = "mostrador";
    pub const TICKETS: &str = "tickets";

    pub const REVENUE: &str = "facturacion";
    pub const AVG_TICKET: &str = "ticket_promedio";
    pub const DINING_PCT: &str = "pct_salon";
    pub const COUNTER_PCT: &str = "pct_mostrador";

    pub const ALL: [&str; 5] = [BRANCH, PERIOD, DINING, COUNTER, TICKETS];
    pub const REQUIRED: [&str; 3] = [PERIOD, DINING, COUNTER];
}

// ── Raw header synonyms seen in POS exports ─────────────────────────────────
pub mod raw {
    pub const NAME: &str = "nombre";
    pub const SALE: &str = "venta";
    pub const SALES: &str = "ventas";
    pub const DATE: &str = "fecha";
    pub const DINING_ACCENTED: &str = "salón";
}

// ── ABC ranking columns ─────────────────────────────────────────────────────
pub mod abc {
    pub const CUMULATIVE: &str = "acumulado";
    pub const CUMULATIVE_PCT: &str = "pct_acumulado";
    pub const CLASS: &str = "clase";
}

// ── ABC per-tier summary columns ────────────────────────────────────────────
pub mod abc_summary {
    pub const CLASS: &str = "clase";
    pub const ITEMS: &str = "productos";
    pub const REVENUE: &str = "facturacion";
}
