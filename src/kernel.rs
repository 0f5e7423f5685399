//! Kernel command line parameters

/// Kernel parameter controlling predictable network interface names
pub const KERNEL_PARAM_NET_IFNAMES: &str = "net.ifnames";

/// A single kernel parameter, possibly repeated with several values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelParameter {
    key: String,
    values: Vec<String>,
}

impl KernelParameter {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
        }
    }

    /// Add a value; each value renders as its own `key=value` pair
    pub fn append(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl std::fmt::Display for KernelParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.values.is_empty() {
            return write!(f, "{}", self.key);
        }
        let pairs: Vec<String> = self
            .values
            .iter()
            .map(|v| format!("{}={}", self.key, v))
            .collect();
        write!(f, "{}", pairs.join(" "))
    }
}

/// Ordered set of kernel parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelParameters(Vec<KernelParameter>);

impl KernelParameters {
    pub fn get(&self, key: &str) -> Option<&KernelParameter> {
        self.0.iter().find(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<KernelParameter>> for KernelParameters {
    fn from(params: Vec<KernelParameter>) -> Self {
        Self(params)
    }
}

impl std::fmt::Display for KernelParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(" "))
    }
}
