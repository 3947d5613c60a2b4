pub mod chart_service;
pub mod quote_service;
pub mod rate_service;
pub mod reconciler;
pub mod valuation;
