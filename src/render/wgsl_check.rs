//! Offline checks of the embedded WGSL against the Rust-side layouts.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Module, ShaderStage, TypeInner};

/// Parse and validate `source`, panicking with naga's diagnostics.
pub fn validate(label: &str, source: &str) -> Module {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|err| panic!("{label}: {}", err.emit_to_string(source)));
    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .unwrap_or_else(|err| panic!("{label}: {err:?}"));
    module
}

pub fn entry_points(module: &Module) -> Vec<(&str, ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

/// Group-0 resources as `(binding, kind)`, sorted by binding.
pub fn bindings(module: &Module) -> Vec<(u32, &'static str)> {
    let mut out: Vec<_> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            assert_eq!(binding.group, 0, "{:?} is outside group 0", var.name);
            let kind = match module.types[var.ty].inner {
                TypeInner::Image { .. } => "texture",
                TypeInner::Sampler { comparison: false } => "sampler",
                _ if var.space == AddressSpace::Uniform => "uniform",
                _ => "other",
            };
            Some((binding.binding, kind))
        })
        .collect();
    out.sort();
    out
}

/// Byte size of the uniform bound at `binding`.
pub fn uniform_size(module: &Module, binding: u32) -> Option<u32> {
    module
        .global_variables
        .iter()
        .map(|(_, var)| var)
        .find(|var| {
            var.space == AddressSpace::Uniform
                && var.binding.as_ref().map(|b| b.binding) == Some(binding)
        })
        .map(|var| module.types[var.ty].inner.size(module.to_ctx()))
}

/// `@location`s read by the vertex entry point, sorted.
pub fn vertex_locations(module: &Module) -> Vec<u32> {
    let mut out = Vec::new();
    for ep in module.entry_points.iter().filter(|ep| ep.stage == ShaderStage::Vertex) {
        for arg in &ep.function.arguments {
            if let Some(Binding::Location { location, .. }) = arg.binding {
                out.push(location);
            } else if let TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                out.extend(members.iter().filter_map(|m| match m.binding {
                    Some(Binding::Location { location, .. }) => Some(location),
                    _ => None,
                }));
            }
        }
    }
    out.sort();
    out
}

/// Shader locations provided by a set of vertex buffer layouts, sorted.
pub fn layout_locations(layouts: &[wgpu::VertexBufferLayout<'_>]) -> Vec<u32> {
    let mut out: Vec<u32> = layouts
        .iter()
        .flat_map(|layout| layout.attributes.iter().map(|a| a.shader_location))
        .collect();
    out.sort();
    out
}

/// Whether the fragment entry point returns a `mix(..)` expression.
pub fn fragment_returns_mix(module: &Module) -> bool {
    module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == ShaderStage::Fragment)
        .any(|ep| {
            let function = &ep.function;
            function.body.iter().any(|statement| match statement {
                naga::Statement::Return { value: Some(value) } => matches!(
                    function.expressions[*value],
                    naga::Expression::Math {
                        fun: naga::MathFunction::Mix,
                        ..
                    }
                ),
                _ => false,
            })
        })
}
