//! Document statistics for `utl stats`.

use std::fmt;

use utl_json::{Format, Value};
use utl_parallel::{Grain, ThreadPool};

/// Value counts by kind plus nesting depth.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub nulls: usize,
    pub bools: usize,
    pub numbers: usize,
    pub strings: usize,
    pub arrays: usize,
    pub objects: usize,
    /// Containers on the deepest path; scalars have depth 0.
    pub max_depth: usize,
}

impl Stats {
    /// Statistics of one subtree, computed on the calling thread.
    pub fn of(value: &Value) -> Self {
        let mut stats = Stats::default();
        match value {
            Value::Null => stats.nulls = 1,
            Value::Bool(_) => stats.bools = 1,
            Value::Number(_) => stats.numbers = 1,
            Value::String(_) => stats.strings = 1,
            Value::Array(items) => {
                stats.arrays = 1;
                stats.max_depth = 1;
                stats = items.iter().map(Stats::of).fold(stats, Stats::merge_child);
            }
            Value::Object(object) => {
                stats.objects = 1;
                stats.max_depth = 1;
                stats = object.values().map(Stats::of).fold(stats, Stats::merge_child);
            }
        }
        stats
    }

    /// Statistics of a whole document, with the root's children summarized in
    /// parallel on `pool`.
    pub fn of_document(value: Value, pool: &ThreadPool) -> anyhow::Result<Self> {
        let (mut root, children) = match value {
            Value::Array(items) => (
                Stats {
                    arrays: 1,
                    max_depth: 1,
                    ..Stats::default()
                },
                items,
            ),
            Value::Object(object) => (
                Stats {
                    objects: 1,
                    max_depth: 1,
                    ..Stats::default()
                },
                object.into_iter().map(|(_, v)| v).collect(),
            ),
            scalar => return Ok(Stats::of(&scalar)),
        };
        tracing::debug!(children = children.len(), threads = pool.thread_count(), "summarizing document");
        for child in pool.blocking_map(children, Grain::Auto, Stats::of)? {
            root = root.merge_child(child);
        }
        Ok(root)
    }

    /// Add a child's counts; `self` is the child's parent container.
    fn merge_child(self, child: Stats) -> Stats {
        Stats {
            nulls: self.nulls + child.nulls,
            bools: self.bools + child.bools,
            numbers: self.numbers + child.numbers,
            strings: self.strings + child.strings,
            arrays: self.arrays + child.arrays,
            objects: self.objects + child.objects,
            max_depth: self.max_depth.max(child.max_depth + 1),
        }
    }

    pub fn total(&self) -> usize {
        self.nulls + self.bools + self.numbers + self.strings + self.arrays + self.objects
    }
}

/// A report of [`Stats`] plus the serialized sizes of the document.
pub struct Report {
    pub stats: Stats,
    pub input_bytes: usize,
    pub minimized_bytes: usize,
    pub pretty_bytes: usize,
}

impl Report {
    pub fn new(value: &Value, input_bytes: usize, stats: Stats) -> Self {
        Report {
            stats,
            input_bytes,
            minimized_bytes: value.to_string_with(Format::Minimized).len(),
            pretty_bytes: value.to_string_with(Format::Pretty).len(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        writeln!(f, "Values:     {}", s.total())?;
        writeln!(f, "  objects:  {}", s.objects)?;
        writeln!(f, "  arrays:   {}", s.arrays)?;
        writeln!(f, "  strings:  {}", s.strings)?;
        writeln!(f, "  numbers:  {}", s.numbers)?;
        writeln!(f, "  bools:    {}", s.bools)?;
        writeln!(f, "  nulls:    {}", s.nulls)?;
        writeln!(f, "Max depth:  {}", s.max_depth)?;
        writeln!(f, "Input:      {} bytes", self.input_bytes)?;
        writeln!(f, "Minimized:  {} bytes", self.minimized_bytes)?;
        write!(f, "Pretty:     {} bytes", self.pretty_bytes)
    }
}
