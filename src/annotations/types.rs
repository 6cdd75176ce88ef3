/// Literal native code lifted from a `/*cpp ... */` block of a script source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedFragment {
    /// 1-based line of the opening marker.
    pub source_line: usize,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    Char,
    Int,
    LongLong,
    Float,
    Double,
}

impl PrimitiveType {
    /// Parse the `<primitive>` part of a `<primitive>_t` annotation.
    pub fn from_annotation(word: &str) -> Option<Self> {
        match word {
            "bool" => Some(PrimitiveType::Bool),
            "char" => Some(PrimitiveType::Char),
            "int" => Some(PrimitiveType::Int),
            "longlong" => Some(PrimitiveType::LongLong),
            "float" => Some(PrimitiveType::Float),
            "double" => Some(PrimitiveType::Double),
            _ => None,
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::LongLong => "long long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn allows_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveType::Char | PrimitiveType::Int | PrimitiveType::LongLong
        )
    }
}

/// A request to store a script local as a native primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDeclarationRequest {
    pub name: String,
    pub ty: PrimitiveType,
    pub is_static: bool,
    pub is_const: bool,
    pub is_unsigned: bool,
}

impl NativeDeclarationRequest {
    /// Qualified native type, e.g. `static const unsigned int`.
    pub fn native_type(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.is_static {
            parts.push("static");
        }
        if self.is_const {
            parts.push("const");
        }
        if self.is_unsigned {
            parts.push("unsigned");
        }
        parts.push(self.ty.native_name());
        parts.join(" ")
    }

    /// Static and const locals need their value at the declaration.
    pub fn needs_initializer(&self) -> bool {
        self.is_static || self.is_const
    }
}

/// Everything the scanner pulls out of one script source.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub fragments: Vec<AnnotatedFragment>,
    pub declarations: Vec<NativeDeclarationRequest>,
    pub run_async: bool,
    /// Open markers that never saw a close marker.
    pub dropped_fragments: usize,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.declarations.is_empty() && !self.run_async
    }
}
