pub mod eto_service;

pub use eto_service::{
    estimate_windows, select_windows, DateRange, DayDetail, EtoService, ServiceError,
};
