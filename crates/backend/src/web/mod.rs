pub mod echarts;
pub mod page;
