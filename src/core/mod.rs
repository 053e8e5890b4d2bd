// Copyright @yucwang 2021

pub mod bsdf;
pub mod bvh;
pub mod computation_node;
pub mod emitter;
pub mod error;
pub mod integrator;
pub mod interaction;
pub mod sampler;
pub mod scene;
pub mod shape;
pub mod texture;
