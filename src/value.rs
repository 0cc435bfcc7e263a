#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Int(u32),
    String(String),
    None,
}

impl Default for Val {
    fn default() -> Self {
        Val::None
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Val::Int(i) => write!(f, "{}", i),
            Val::String(s) => f.write_str(s),
            Val::None => Ok(()),
        }
    }
}
