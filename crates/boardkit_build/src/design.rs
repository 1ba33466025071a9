//! The synthesizable design handed to a build.

use indexmap::IndexMap;

use boardkit_platform::Clock;

/// HDL sources plus the platform resources the design binds to.
///
/// The design is opaque to the pipeline: its sources are written into the
/// build directory unchanged and handed to the toolchain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Design {
    /// Name of the top-level module.
    pub top: String,
    /// Source files by file name, in the order they should be read.
    pub sources: IndexMap<String, String>,
    /// Requested resources by `(name, index)`, in binding order.
    pub requests: Vec<(String, u32)>,
    /// Clock constraints on requested resources, replacing the board's own.
    pub clocks: Vec<(String, u32, Clock)>,
}

impl Design {
    /// Creates an empty design with the given top module.
    pub fn new(top: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            ..Self::default()
        }
    }

    /// Adds a source file.
    pub fn with_source(mut self, file: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(file.into(), text.into());
        self
    }

    /// Requests a platform resource.
    pub fn request(mut self, name: impl Into<String>, index: u32) -> Self {
        self.requests.push((name.into(), index));
        self
    }

    /// Constrains a requested resource to run at `clock`.
    pub fn with_clock(mut self, name: impl Into<String>, index: u32, clock: Clock) -> Self {
        self.clocks.push((name.into(), index, clock));
        self
    }

    /// Source file names with the given extension, in declaration order.
    pub fn files_with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sources
            .keys()
            .map(String::as_str)
            .filter(move |f| f.rsplit_once('.').is_some_and(|(_, e)| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_by_extension_keep_order() {
        let d = Design::new("top")
            .with_source("b.v", "")
            .with_source("pkg.sv", "")
            .with_source("a.v", "")
            .request("led", 0);
        assert_eq!(d.files_with_extension("v").collect::<Vec<_>>(), vec!["b.v", "a.v"]);
        assert_eq!(d.files_with_extension("sv").collect::<Vec<_>>(), vec!["pkg.sv"]);
        assert_eq!(d.requests, vec![("led".to_string(), 0)]);
    }
}
