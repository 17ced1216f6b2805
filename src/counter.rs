//! Labelled family of decaying sketches and their register export.
//!
//! One [`DecayingSketch`] is created lazily per distinct label-value tuple.
//! Collection emits one gauge sample per register, with the register index
//! carried in an extra `m` label.

use crate::sketch::{
    DecayingSketch, DistinctConfig, DistinctError, DistinctSketchOps,
    DistinctSketchStats, Result,
};
use derive_builder::Builder;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Label appended to every exported sample, holding the register index.
pub const REGISTER_LABEL: &str = "m";

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct DistinctCounterOpts {
    pub name: String,
    #[builder(default)]
    pub help: String,
    #[builder(default)]
    pub label_names: Vec<String>,
    #[builder(default)]
    pub sketch: DistinctConfig,
}

impl DistinctCounterOpts {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.is_empty() {
            return Err("Metric name must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        for label in &self.label_names {
            if label.is_empty() {
                return Err("Label names must not be empty".to_string());
            }
            if label == REGISTER_LABEL {
                return Err(format!(
                    "Label name '{REGISTER_LABEL}' is reserved for the register index"
                ));
            }
            if !seen.insert(label.as_str()) {
                return Err(format!("Duplicate label name '{label}'"));
            }
        }
        self.sketch.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
}

/// One register of one child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSample {
    pub name: String,
    pub label_names: Vec<String>,
    pub label_values: Vec<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<RegisterSample>,
}

/// Counter of distinct observations over a sliding window, per label set.
pub struct DistinctCounter {
    opts: DistinctCounterOpts,
    children: RwLock<FnvHashMap<Vec<String>, Arc<DecayingSketch>>>,
    no_labels_child: Option<Arc<DecayingSketch>>,
}

impl DistinctCounter {
    pub fn new(opts: DistinctCounterOpts) -> Result<Self> {
        opts.validate()?;

        let no_labels_child = if opts.label_names.is_empty() {
            Some(Arc::new(DecayingSketch::new(opts.sketch.clone())?))
        } else {
            None
        };

        info!(
            name = %opts.name,
            labels = opts.label_names.len(),
            log_size = opts.sketch.log_size,
            "created distinct counter"
        );

        Ok(Self {
            opts,
            children: RwLock::new(FnvHashMap::default()),
            no_labels_child,
        })
    }

    pub fn name(&self) -> &str {
        &self.opts.name
    }

    pub fn label_names(&self) -> &[String] {
        &self.opts.label_names
    }

    fn check_arity(&self, values: &[&str]) -> Result<()> {
        let expected = self.opts.label_names.len();
        if values.len() != expected {
            return Err(DistinctError::LabelCardinality {
                expected,
                got: values.len(),
            });
        }
        Ok(())
    }

    /// Sketch for one label-value tuple, created on first use.
    pub fn with_label_values(&self, values: &[&str]) -> Result<Arc<DecayingSketch>> {
        self.check_arity(values)?;
        if let Some(child) = &self.no_labels_child {
            return Ok(Arc::clone(child));
        }

        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        {
            let children = self.children.read().map_err(|_| {
                DistinctError::LockError("Failed to read children".to_string())
            })?;
            if let Some(child) = children.get(&key) {
                return Ok(Arc::clone(child));
            }
        }

        let mut children = self.children.write().map_err(|_| {
            DistinctError::LockError("Failed to write children".to_string())
        })?;
        // Another thread may have created it between the two locks.
        if let Some(child) = children.get(&key) {
            return Ok(Arc::clone(child));
        }
        let child = Arc::new(DecayingSketch::new(self.opts.sketch.clone())?);
        debug!(name = %self.opts.name, labels = ?key, "created child sketch");
        children.insert(key, Arc::clone(&child));
        Ok(child)
    }

    /// Observe on the unlabelled child.
    pub fn observe(&self, item: &[u8]) -> Result<()> {
        match &self.no_labels_child {
            Some(child) => child.observe(item),
            None => Err(DistinctError::MissingLabels),
        }
    }

    pub fn estimate(&self, values: &[&str]) -> Result<f64> {
        self.with_label_values(values)?.estimate()
    }

    /// Drops the child for `values`. Returns whether it existed.
    pub fn remove(&self, values: &[&str]) -> Result<bool> {
        self.check_arity(values)?;
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let mut children = self.children.write().map_err(|_| {
            DistinctError::LockError("Failed to write children".to_string())
        })?;
        Ok(children.remove(&key).is_some())
    }

    /// Drops every labelled child.
    pub fn clear(&self) -> Result<()> {
        let mut children = self.children.write().map_err(|_| {
            DistinctError::LockError("Failed to write children".to_string())
        })?;
        children.clear();
        Ok(())
    }

    fn sorted_children(&self) -> Result<Vec<(Vec<String>, Arc<DecayingSketch>)>> {
        if let Some(child) = &self.no_labels_child {
            return Ok(vec![(Vec::new(), Arc::clone(child))]);
        }
        let children = self.children.read().map_err(|_| {
            DistinctError::LockError("Failed to read children".to_string())
        })?;
        let mut entries: Vec<_> = children
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    /// Registers of every child as gauge samples.
    ///
    /// Snapshots are taken one child at a time, outside the children lock.
    pub fn collect(&self) -> Result<MetricFamily> {
        let entries = self.sorted_children()?;

        let mut label_names = self.opts.label_names.clone();
        label_names.push(REGISTER_LABEL.to_string());

        let register_count = self.opts.sketch.register_count();
        let mut samples = Vec::with_capacity(entries.len() * register_count);
        for (values, child) in entries {
            let registers = child.snapshot()?;
            debug_assert_eq!(registers.len(), child.register_count());
            for (index, register) in registers.iter().enumerate() {
                let mut label_values = values.clone();
                label_values.push(index.to_string());
                samples.push(RegisterSample {
                    name: self.opts.name.clone(),
                    label_names: label_names.clone(),
                    label_values,
                    value: f64::from(*register),
                });
            }
        }

        Ok(MetricFamily {
            name: self.opts.name.clone(),
            help: self.opts.help.clone(),
            kind: MetricKind::Gauge,
            samples,
        })
    }
}

impl std::fmt::Debug for DistinctCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DistinctCounter {{ name: {}, label_names: {:?}, sketch: {:?} }}",
            self.opts.name, self.opts.label_names, self.opts.sketch
        )
    }
}

impl MetricFamily {
    /// Registers of one child in index order, rebuilt from the samples.
    pub fn registers_for(&self, values: &[&str]) -> Vec<u8> {
        let mut registers: Vec<(usize, u8)> = self
            .samples
            .iter()
            .filter(|s| {
                s.label_values.len() == values.len() + 1
                    && s.label_values.iter().zip(values).all(|(a, b)| a == b)
            })
            .filter_map(|s| {
                let index = s.label_values.last()?.parse().ok()?;
                Some((index, s.value as u8))
            })
            .collect();
        registers.sort_by_key(|(index, _)| *index);
        registers.into_iter().map(|(_, value)| value).collect()
    }
}
