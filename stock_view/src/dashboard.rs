//! Headline counts for the dashboard.

use inventory_gateway::{
    DataGateway, GatewayResult,
    models::{Branch, Product, Sale, StockRecord},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_branches: usize,
    pub total_stock_records: usize,
    pub total_stock_units: u64,
    pub total_sales: usize,
}

impl DashboardSummary {
    pub fn from_snapshots(
        products: &[Product],
        branches: &[Branch],
        stock: &[StockRecord],
        sales: &[Sale],
    ) -> Self {
        Self {
            total_products: products.len(),
            total_branches: branches.len(),
            total_stock_records: stock.len(),
            total_stock_units: stock.iter().map(|s| u64::from(s.quantity)).sum(),
            total_sales: sales.len(),
        }
    }

    pub async fn load(gateway: &dyn DataGateway) -> GatewayResult<Self> {
        let (products, branches, stock, sales) = tokio::try_join!(
            gateway.list_products(),
            gateway.list_branches(),
            gateway.list_stock(),
            gateway.list_sales(),
        )?;
        Ok(Self::from_snapshots(&products, &branches, &stock, &sales))
    }
}
