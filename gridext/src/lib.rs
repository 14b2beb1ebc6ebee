mod dataset;
mod encoding;
mod errors;
mod extend;
mod select;
mod time;
mod values;
mod verify;

#[cfg(test)]
mod testing;

pub use dataset::Attribute;
pub use dataset::Dataset;
pub use dataset::FieldClass;
pub use dataset::Variable;

pub use encoding::normalize;
pub use encoding::Encoding;
pub use encoding::FillValue;

pub use errors::Error;
pub use errors::Result;

pub use extend::extend;
pub use extend::ExtendOptions;

pub use select::select;
pub use select::select_variable;
pub use select::Cadence;

pub use time::Calendar;
pub use time::CfDatetime;
pub use time::TimeUnit;
pub use time::TimeUnits;

pub use values::Selection;
pub use values::Values;

pub use verify::verify;
