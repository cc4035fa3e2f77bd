//! Affine warps of single channel images.
//!
//! Rotating an image by 45 degrees about its centre:
//!
//! ```
//! use hexraster_image::{Image, ImageSize};
//! use hexraster_imgproc::warp::{get_rotation_matrix2d, warp_affine};
//!
//! let src = Image::<f32, 1>::from_size_val(ImageSize::square(8), 1.0).unwrap();
//! let mut dst = Image::<f32, 1>::from_size_val(ImageSize::square(8), 0.0).unwrap();
//!
//! let m = get_rotation_matrix2d((4.0, 4.0), 45.0, 1.0);
//! warp_affine(&src, &mut dst, &m).unwrap();
//! ```

mod affine;

pub use affine::{get_rotation_matrix2d, invert_affine_transform, warp_affine};
