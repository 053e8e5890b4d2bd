// Copyright @yucwang 2021

pub mod average_visibility;
pub mod direct;
pub mod normals;

use crate::core::error::{ RenderError, Result };
use crate::core::integrator::Integrator;
use crate::math::constants::Float;

use self::average_visibility::AverageVisibilityIntegrator;
use self::direct::{ DirectIntegrator, SamplingStrategy };
use self::normals::NormalIntegrator;

/// Parameters shared by `create_integrator`. Integrators ignore the fields
/// they have no use for.
#[derive(Debug, Clone)]
pub struct IntegratorOptions {
    pub strategy: String,
    pub visibility_length: Float,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self { strategy: String::from("mis"), visibility_length: 1.0 }
    }
}

/// Builds an integrator from its name: `"direct"`, `"normals"` or
/// `"av"`/`"average_visibility"`.
pub fn create_integrator(name: &str, options: &IntegratorOptions) -> Result<Box<dyn Integrator>> {
    match name {
        "direct" => {
            let strategy: SamplingStrategy = options.strategy.parse()?;
            Ok(Box::new(DirectIntegrator::new(strategy)))
        }
        "normals" => Ok(Box::new(NormalIntegrator::new())),
        "av" | "average_visibility" => {
            if !(options.visibility_length > 0.0) {
                return Err(RenderError::Configuration(format!(
                    "visibility length must be positive, got {}", options.visibility_length)));
            }
            Ok(Box::new(AverageVisibilityIntegrator::new(options.visibility_length)))
        }
        _ => Err(RenderError::Configuration(format!("unknown integrator '{}'", name))),
    }
}
