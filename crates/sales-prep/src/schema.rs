//! Canonical warehouse schemas and per-table cleaning rules.
//!
//! The five tables form a star schema: `sales` is the fact table and the
//! other four are dimensions keyed by their `*_id` column.

use crate::scrubber::{FillValue, NumericRange, RenameMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five warehouse tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Sales,
    Customers,
    Products,
    Stores,
    Campaigns,
}

impl TableKind {
    /// All tables, dimensions first so the fact table is prepared last.
    pub const ALL: [TableKind; 5] = [
        TableKind::Customers,
        TableKind::Products,
        TableKind::Stores,
        TableKind::Campaigns,
        TableKind::Sales,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Stores => "stores",
            Self::Campaigns => "campaigns",
        }
    }

    /// Canonical column list, in warehouse order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Sales => &[
                "sale_id",
                "customer_id",
                "product_id",
                "store_id",
                "campaign_id",
                "sale_amount",
                "sale_date",
                "bonus_points",
                "payment_type",
            ],
            Self::Customers => &[
                "customer_id",
                "name",
                "region",
                "join_date",
                "loyalty_points",
                "customer_segment",
            ],
            Self::Products => &[
                "product_id",
                "product_name",
                "category",
                "unit_price",
                "stock_quantity",
                "supplier",
            ],
            Self::Stores => &[
                "store_id",
                "store_name",
                "location",
                "state",
                "country",
                "store_type",
            ],
            Self::Campaigns => &[
                "campaign_id",
                "campaign_name",
                "start_date",
                "end_date",
                "channel",
                "budget_usd",
            ],
        }
    }

    /// Primary key column, used for deduplication.
    pub fn key_column(&self) -> &'static str {
        match self {
            Self::Sales => "sale_id",
            Self::Customers => "customer_id",
            Self::Products => "product_id",
            Self::Stores => "store_id",
            Self::Campaigns => "campaign_id",
        }
    }

    /// Columns holding numbers (ids included, since the warehouse stores them as INTEGER).
    pub fn numeric_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Sales => &[
                "sale_id",
                "customer_id",
                "product_id",
                "store_id",
                "campaign_id",
                "sale_amount",
                "bonus_points",
            ],
            Self::Customers => &["customer_id", "loyalty_points"],
            Self::Products => &["product_id", "unit_price", "stock_quantity"],
            Self::Stores => &["store_id"],
            Self::Campaigns => &["campaign_id", "budget_usd"],
        }
    }

    /// Numeric columns the warehouse declares INTEGER.
    pub fn integer_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Sales => &[
                "sale_id",
                "customer_id",
                "product_id",
                "store_id",
                "campaign_id",
                "bonus_points",
            ],
            Self::Customers => &["customer_id", "loyalty_points"],
            Self::Products => &["product_id", "stock_quantity"],
            Self::Stores => &["store_id"],
            Self::Campaigns => &["campaign_id"],
        }
    }

    pub fn date_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Sales => &["sale_date"],
            Self::Customers => &["join_date"],
            Self::Campaigns => &["start_date", "end_date"],
            Self::Products | Self::Stores => &[],
        }
    }

    /// Free-text columns: everything that is neither numeric nor a date.
    pub fn text_columns(&self) -> Vec<&'static str> {
        let numeric = self.numeric_columns();
        let dates = self.date_columns();
        self.columns()
            .iter()
            .copied()
            .filter(|c| !numeric.contains(c) && !dates.contains(c))
            .collect()
    }

    /// Columns a row cannot be loaded without.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Sales => &["sale_id", "customer_id", "product_id", "sale_amount", "sale_date"],
            Self::Customers => &["customer_id", "name"],
            Self::Products => &["product_id", "product_name"],
            Self::Stores => &["store_id", "store_name"],
            Self::Campaigns => &["campaign_id", "campaign_name"],
        }
    }

    /// Constants substituted for missing values before required-column checks.
    pub fn fill_defaults(&self) -> Vec<(&'static str, FillValue)> {
        match self {
            Self::Sales => vec![("bonus_points", FillValue::Number(0.0))],
            Self::Products => vec![("product_name", FillValue::from("Unknown Product"))],
            Self::Customers | Self::Stores | Self::Campaigns => Vec::new(),
        }
    }

    /// Business rules that drop rows with impossible values.
    pub fn range_rules(&self) -> Vec<(&'static str, NumericRange)> {
        match self {
            Self::Sales => vec![("campaign_id", NumericRange::greater_than(0.0))],
            Self::Products => vec![
                ("stock_quantity", NumericRange::greater_than(0.0)),
                ("unit_price", NumericRange::at_least(0.0)),
            ],
            Self::Customers | Self::Stores | Self::Campaigns => Vec::new(),
        }
    }

    /// Known messy spellings of each canonical column.
    ///
    /// Every canonical name also maps to itself, so `" SALE_ID "` is
    /// reconciled the same way as `TransactionID`.
    pub fn default_rename_map(&self) -> RenameMap {
        let pairs: &[(&str, &str)] = match self {
            Self::Sales => &[
                ("TransactionID", "sale_id"),
                ("transaction_id", "sale_id"),
                ("SaleID", "sale_id"),
                ("Sale ID", "sale_id"),
                ("CustomerID", "customer_id"),
                ("Customer ID", "customer_id"),
                ("ProductID", "product_id"),
                ("Product ID", "product_id"),
                ("StoreID", "store_id"),
                ("Store ID", "store_id"),
                ("CampaignID", "campaign_id"),
                ("Campaign ID", "campaign_id"),
                ("SaleAmount", "sale_amount"),
                ("Sale Amount", "sale_amount"),
                ("Sale Amt", "sale_amount"),
                ("SaleDate", "sale_date"),
                ("Sale Date", "sale_date"),
                ("BonusPoints", "bonus_points"),
                ("Bonus Points", "bonus_points"),
                ("PaymentType", "payment_type"),
                ("Payment Type", "payment_type"),
            ],
            Self::Customers => &[
                ("CustomerID", "customer_id"),
                ("Customer ID", "customer_id"),
                ("Name", "name"),
                ("CustomerName", "name"),
                ("Region", "region"),
                ("JoinDate", "join_date"),
                ("Join Date", "join_date"),
                ("LoyaltyPoints", "loyalty_points"),
                ("Loyalty Points", "loyalty_points"),
                ("CustomerSegment", "customer_segment"),
                ("Customer Segment", "customer_segment"),
                ("Segment", "customer_segment"),
            ],
            Self::Products => &[
                ("ProductID", "product_id"),
                ("Product ID", "product_id"),
                ("ProductName", "product_name"),
                ("productname", "product_name"),
                ("Product Name", "product_name"),
                ("Category", "category"),
                ("UnitPrice", "unit_price"),
                ("Unit Price", "unit_price"),
                ("StockQuantity", "stock_quantity"),
                ("Stock Quantity", "stock_quantity"),
                ("Supplier", "supplier"),
            ],
            Self::Stores => &[
                ("StoreID", "store_id"),
                ("Store ID", "store_id"),
                ("StoreName", "store_name"),
                ("Store Name", "store_name"),
                ("Location", "location"),
                ("City", "location"),
                ("State", "state"),
                ("Country", "country"),
                ("StoreType", "store_type"),
                ("Store Type", "store_type"),
            ],
            Self::Campaigns => &[
                ("CampaignID", "campaign_id"),
                ("Campaign ID", "campaign_id"),
                ("CampaignName", "campaign_name"),
                ("Campaign Name", "campaign_name"),
                ("StartDate", "start_date"),
                ("Start Date", "start_date"),
                ("EndDate", "end_date"),
                ("End Date", "end_date"),
                ("Channel", "channel"),
                ("BudgetUSD", "budget_usd"),
                ("Budget (USD)", "budget_usd"),
                ("Budget", "budget_usd"),
            ],
        };
        let identity = self.columns().iter().map(|c| (*c, *c));
        RenameMap::from_pairs(pairs.iter().copied().chain(identity))
    }

    /// Raw input file, e.g. `sales_data.csv`.
    pub fn raw_file_name(&self) -> String {
        format!("{}_data.csv", self.name())
    }

    /// Prepared output file, e.g. `sales_data_prepared.csv`.
    pub fn prepared_file_name(&self) -> String {
        format!("{}_data_prepared.csv", self.name())
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown table '{}'", s))
    }
}
