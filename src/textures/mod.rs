// Copyright @yucwang 2026

pub mod checkerboard;
pub mod constant;
