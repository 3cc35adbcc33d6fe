// Domain layer - Fatigue readings, forecasts and alert rules
pub mod alert;
pub mod forecast;
pub mod reading;
pub mod series;
