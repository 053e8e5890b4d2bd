// Copyright 2020 TwoCookingMice

use penumbra::core::error::Result;
use penumbra::core::integrator::Integrator;
use penumbra::core::sampler::Sampler;
use penumbra::core::scene::Scene;
use penumbra::emitters::area::AreaEmitter;
use penumbra::integrators::{ create_integrator, IntegratorOptions };
use penumbra::materials::microfacet::MicrofacetBSDF;
use penumbra::math::constants::{ Float, Vector3f };
use penumbra::math::ray::Ray3f;
use penumbra::math::spectrum::RGBSpectrum;
use penumbra::samplers::independent::IndependentSampler;
use penumbra::shapes::sphere::Sphere;
use penumbra::shapes::triangle_mesh::TriangleMesh;

use log::info;
use std::env;
use std::sync::Arc;

// A spherical light hovering over a glossy floor.
fn build_scene() -> Result<Scene> {
    let mut scene = Scene::new();
    let floor = scene.add_shape(Box::new(TriangleMesh::quad(Vector3f::new(-10.0, -10.0, 0.0),
                                                            Vector3f::new(20.0, 0.0, 0.0),
                                                            Vector3f::new(0.0, 20.0, 0.0))?
                                         .with_id("floor")));
    scene.set_bsdf(floor, Arc::new(MicrofacetBSDF::default()))?;
    scene.add_emissive_shape(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 3.0), 1.0).with_id("light")),
                             Box::new(AreaEmitter::new(RGBSpectrum::splat(10.0))))?;
    scene.activate()?;
    Ok(scene)
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <emitter|bsdf|mis> [--spp N] [--seed N]", args[0]);
        std::process::exit(1);
    }

    let mut spp: u32 = 1024;
    let mut seed: u64 = 0;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(spp);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(seed);
            }
            other => eprintln!("Ignoring unknown argument '{}'.", other),
        }
        i += 1;
    }

    let options = IntegratorOptions { strategy: args[1].clone(), ..IntegratorOptions::default() };
    let integrator: Box<dyn Integrator> = create_integrator("direct", &options)
        .unwrap_or_else(|e| panic!("failed to create integrator: {}", e));
    let scene = build_scene().unwrap_or_else(|e| panic!("failed to build scene: {}", e));
    info!("Integrator: {}", integrator.describe());

    let spp = spp.max(1);
    let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.5), Vector3f::new(0.0, 0.0, -1.0), None, None);
    let mut sampler: Box<dyn Sampler> = Box::new(IndependentSampler::new(seed));
    let mut accum = RGBSpectrum::zero();
    for _ in 0..spp {
        accum += integrator.trace_ray(&scene, &ray, sampler.as_mut());
    }

    let avg = accum / (spp as Float);
    println!("strategy={} spp={} -> R {:.6}, G {:.6}, B {:.6}", options.strategy, spp, avg[0], avg[1], avg[2]);
}
