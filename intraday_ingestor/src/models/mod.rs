pub mod bar;
pub mod bar_series;
pub mod frame;
pub mod price_matrix;
pub mod request_params;
pub mod timeframe;
