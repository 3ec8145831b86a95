// Risk scoring: combines keyword, sentiment and recency signals.

pub mod risk;
