//! Traits needed to drive the controller
pub use embedded_can::nb::Can as _;
pub use embedded_can::Frame as _;
pub use rscanfd_core::CanDriver as _;
pub use rscanfd_core::RegisterAccess as _;
