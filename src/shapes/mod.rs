// Copyright @yucwang 2021

pub mod sphere;
pub mod triangle_mesh;
