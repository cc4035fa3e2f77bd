#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use hexraster_image as image;

#[doc(inline)]
pub use hexraster_imgproc as imgproc;

#[doc(inline)]
pub use hexraster_mapping as mapping;
