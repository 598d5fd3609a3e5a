use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{BindError, ConfigLink, ConfigStore};
use crate::formula::{ConfigSwitch, FormulaError, ValueExpr};

/// Turns a tagged formula document into a [`ValueExpr`].
///
/// Decoders for nested formulas recurse through [`DecodeContext::decode`].
pub trait FormulaDecoder: Send + Sync {
    fn decode(&self, data: &Value, ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError>;
}

impl<F> FormulaDecoder for F
where
    F: Fn(&Value, &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> + Send + Sync,
{
    fn decode(&self, data: &Value, ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
        self(data, ctx)
    }
}

// ---------------------------------------------------------------------------
// Decode context
// ---------------------------------------------------------------------------

/// State threaded through one decoding session.
///
/// Config binding failures do not fail the decode; they are collected here
/// and the affected switch keeps its fallback.
pub struct DecodeContext<'a> {
    registry: &'a FormulaRegistry,
    config: &'a dyn ConfigStore,
    bind_errors: Vec<BindError>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a FormulaRegistry, config: &'a dyn ConfigStore) -> Self {
        Self {
            registry,
            config,
            bind_errors: Vec::new(),
        }
    }

    /// Decode a (possibly nested) formula document.
    pub fn decode(&mut self, data: &Value) -> Result<ValueExpr, FormulaError> {
        let registry = self.registry;
        registry.decode(data, self)
    }

    pub fn config(&self) -> &'a dyn ConfigStore {
        self.config
    }

    /// Bind `key`, recording a failure and returning an unbound link instead.
    pub fn bind(&mut self, key: &str) -> ConfigLink {
        match ConfigLink::bind(self.config, key) {
            Ok(link) => link,
            Err(err) => {
                tracing::warn!("{err}; formula will use its fallback");
                self.bind_errors.push(err);
                ConfigLink::unbound(key)
            }
        }
    }

    pub fn bind_errors(&self) -> &[BindError] {
        &self.bind_errors
    }

    /// Take the binding failures collected so far.
    pub fn take_bind_errors(&mut self) -> Vec<BindError> {
        std::mem::take(&mut self.bind_errors)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Builder for an immutable [`FormulaRegistry`].
///
/// Every formula kind must be registered before any data referencing it is
/// decoded.
pub struct RegistryBuilder {
    decoders: HashMap<String, Arc<dyn FormulaDecoder>>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// An empty builder with no formula kinds.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// A builder pre-loaded with the built-in kinds.
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        builder.decoders.insert("constant".to_string(), Arc::new(decode_constant));
        builder.decoders.insert("polynomial".to_string(), Arc::new(decode_polynomial));
        builder.decoders.insert("negate".to_string(), Arc::new(decode_negate));
        builder.decoders.insert("probabilistic".to_string(), Arc::new(decode_probabilistic));
        builder.decoders.insert("config_switch".to_string(), Arc::new(decode_config_switch));
        builder
    }

    /// Bind `name` to `decoder`. Fails if the name is already bound.
    pub fn register(
        &mut self,
        name: &str,
        decoder: impl FormulaDecoder + 'static,
    ) -> Result<(), FormulaError> {
        if self.decoders.contains_key(name) {
            return Err(FormulaError::DuplicateFormula {
                name: name.to_string(),
            });
        }
        self.decoders.insert(name.to_string(), Arc::new(decoder));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    pub fn build(self) -> FormulaRegistry {
        FormulaRegistry {
            decoders: self.decoders,
        }
    }
}

/// Immutable name → decoder table. Frozen after [`RegistryBuilder::build`].
pub struct FormulaRegistry {
    decoders: HashMap<String, Arc<dyn FormulaDecoder>>,
}

impl Default for FormulaRegistry {
    fn default() -> Self {
        RegistryBuilder::with_builtins().build()
    }
}

impl FormulaRegistry {
    /// Decode a tagged document.
    ///
    /// A bare number is shorthand for a flat per-level amount.
    pub fn decode(&self, data: &Value, ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
        match data {
            Value::Number(n) => n
                .as_f64()
                .map(|amount| ValueExpr::per_level(amount as f32))
                .ok_or_else(|| malformed("constant", "number out of range")),
            Value::Object(map) => match map.get("type") {
                Some(Value::String(name)) => self.decode_named(name, data, ctx),
                Some(_) => Err(malformed("formula", "'type' must be a string")),
                None => Err(FormulaError::MissingType),
            },
            _ => Err(malformed("formula", "expected a number or a tagged object")),
        }
    }

    /// Decode `data` with the decoder registered under `name`.
    pub fn decode_named(
        &self,
        name: &str,
        data: &Value,
        ctx: &mut DecodeContext<'_>,
    ) -> Result<ValueExpr, FormulaError> {
        let decoder = self.decoders.get(name).ok_or_else(|| FormulaError::UnknownFormula {
            name: name.to_string(),
        })?;
        decoder.decode(data, ctx)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Built-in decoders
// ---------------------------------------------------------------------------

fn malformed(kind: &str, detail: impl Into<String>) -> FormulaError {
    FormulaError::Malformed {
        kind: kind.to_string(),
        detail: detail.into(),
    }
}

/// Deserialize the fields of a `kind` document.
pub fn fields<T: DeserializeOwned>(kind: &str, data: &Value) -> Result<T, FormulaError> {
    T::deserialize(data).map_err(|e| malformed(kind, e.to_string()))
}

fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct ConstantFields {
    base: f32,
    #[serde(default)]
    decrement: f32,
    #[serde(default)]
    floor: f32,
}

#[derive(Deserialize)]
struct PolynomialFields {
    #[serde(default = "one")]
    scale: f32,
    #[serde(default = "one")]
    power: f32,
    #[serde(default)]
    offset: f32,
    #[serde(default)]
    level_offset: f32,
}

#[derive(Deserialize)]
struct NegateFields {
    value: Value,
}

#[derive(Deserialize)]
struct ProbabilisticFields {
    chance: Value,
}

#[derive(Deserialize)]
struct ConfigSwitchFields {
    property: String,
    #[serde(default)]
    cases: BTreeMap<String, Value>,
    fallback: Value,
}

fn decode_constant(data: &Value, _ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
    let f: ConstantFields = fields("constant", data)?;
    Ok(ValueExpr::constant(f.base, f.decrement, f.floor))
}

fn decode_polynomial(data: &Value, _ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
    let f: PolynomialFields = fields("polynomial", data)?;
    Ok(ValueExpr::polynomial(f.scale, f.power, f.offset, f.level_offset))
}

fn decode_negate(data: &Value, ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
    let f: NegateFields = fields("negate", data)?;
    Ok(ValueExpr::negate(ctx.decode(&f.value)?))
}

fn decode_probabilistic(data: &Value, ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
    let f: ProbabilisticFields = fields("probabilistic", data)?;
    Ok(ValueExpr::probabilistic(ctx.decode(&f.chance)?))
}

fn decode_config_switch(data: &Value, ctx: &mut DecodeContext<'_>) -> Result<ValueExpr, FormulaError> {
    let f: ConfigSwitchFields = fields("config_switch", data)?;
    let fallback = ctx.decode(&f.fallback)?;
    let mut cases = BTreeMap::new();
    for (value, case) in &f.cases {
        cases.insert(value.clone(), ctx.decode(case)?);
    }
    // Bind last so a malformed document does not report a binding failure.
    let link = ctx.bind(&f.property);
    Ok(ConfigSwitch::new(link, cases, fallback).into())
}
