// Copyright 2020 @TwoCookingMice

pub mod aabb;
pub mod constants;
pub mod dpdf;
pub mod frame;
pub mod ray;
pub mod spectrum;
pub mod warp;
