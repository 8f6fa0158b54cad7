//! Resolved C types and memory layout
//!
//! [`CType`] is the type attached to every declaration and expression after
//! resolution. Sizes and alignments follow a 64-bit data model:
//!
//! | type      | size              | align          |
//! |-----------|-------------------|----------------|
//! | `char`    | 1                 | 1              |
//! | `int`     | 4                 | 4              |
//! | pointer   | 8                 | 8              |
//! | `T[n]`    | `n * sizeof(T)`   | `alignof(T)`   |
//! | struct    | see [`StructLayout`] | max field align (1 if empty) |
//!
//! `void` only appears behind a pointer; it counts as one byte for pointer
//! arithmetic on `void *`.

use crate::interpreter::constants::{INT_SIZE, WORD_SIZE};
use std::fmt;
use std::rc::Rc;

/// A fully resolved type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    Void,
    Char,
    Int,
    Pointer(Box<CType>),
    Array { elem: Box<CType>, len: usize },
    Struct(Rc<StructLayout>),
}

impl CType {
    pub fn pointer_to(inner: CType) -> CType {
        CType::Pointer(Box::new(inner))
    }

    pub fn array_of(elem: CType, len: usize) -> CType {
        CType::Array {
            elem: Box::new(elem),
            len,
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        match self {
            CType::Void | CType::Char => 1,
            CType::Int => INT_SIZE,
            CType::Pointer(_) => WORD_SIZE,
            CType::Array { elem, len } => elem.size() * len,
            CType::Struct(layout) => layout.size,
        }
    }

    /// Alignment in bytes
    pub fn align(&self) -> usize {
        match self {
            CType::Void | CType::Char => 1,
            CType::Int => INT_SIZE,
            CType::Pointer(_) => WORD_SIZE,
            CType::Array { elem, .. } => elem.align(),
            CType::Struct(layout) => layout.align,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, CType::Int | CType::Char)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, CType::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, CType::Array { .. })
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, CType::Struct(_))
    }

    /// Integers and pointers: the types with a truth value
    pub fn is_scalar(&self) -> bool {
        self.is_integer() || self.is_pointer()
    }

    /// Element type of a pointer or array
    pub fn pointee(&self) -> Option<&CType> {
        match self {
            CType::Pointer(inner) => Some(inner),
            CType::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Array-to-pointer decay; other types are returned unchanged
    pub fn decay(&self) -> CType {
        match self {
            CType::Array { elem, .. } => CType::Pointer(elem.clone()),
            other => other.clone(),
        }
    }

    /// Scale factor for pointer arithmetic on this pointer type
    pub fn scale(&self) -> usize {
        self.pointee().map(CType::size).unwrap_or(1)
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Char => write!(f, "char"),
            CType::Int => write!(f, "int"),
            CType::Pointer(inner) => write!(f, "{}*", inner),
            CType::Array { elem, len } => write!(f, "{}[{}]", elem, len),
            CType::Struct(layout) => match &layout.tag {
                Some(tag) => write!(f, "struct {}", tag),
                None => write!(f, "struct <anonymous#{}>", layout.id),
            },
        }
    }
}

/// Result type of a binary arithmetic operation on two integer operands.
///
/// Both `char` and `int` promote to `int`.
pub fn common_type(lhs: &CType, rhs: &CType) -> Option<CType> {
    if lhs.is_integer() && rhs.is_integer() {
        Some(CType::Int)
    } else {
        None
    }
}

/// Round `offset` up to the next multiple of `align`
pub fn align_to(offset: usize, align: usize) -> usize {
    if align <= 1 {
        offset
    } else {
        offset.div_ceil(align) * align
    }
}

/// A struct field with its byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub ty: CType,
    pub offset: usize,
}

/// Byte layout of one struct type, computed once per definition.
///
/// Two struct types are the same type only if they come from the same
/// definition; `id` is unique per definition.
#[derive(Debug, Clone)]
pub struct StructLayout {
    pub id: usize,
    pub tag: Option<String>,
    pub fields: Vec<FieldLayout>,
    pub size: usize,
    pub align: usize,
}

impl PartialEq for StructLayout {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StructLayout {}

impl StructLayout {
    /// Lay out `fields` in declaration order.
    ///
    /// Each field starts at the next multiple of its own alignment; the total
    /// size is rounded up to the largest field alignment. An empty struct has
    /// size 0 and alignment 1.
    pub fn compute(id: usize, tag: Option<String>, fields: Vec<(String, CType)>) -> Self {
        let mut offset = 0;
        let mut align = 1;
        let mut laid_out = Vec::with_capacity(fields.len());

        for (name, ty) in fields {
            let field_align = ty.align();
            offset = align_to(offset, field_align);
            align = align.max(field_align);
            let size = ty.size();
            laid_out.push(FieldLayout { name, ty, offset });
            offset += size;
        }

        StructLayout {
            id,
            tag,
            fields: laid_out,
            size: align_to(offset, align),
            align,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(fields: &[(&str, CType)]) -> StructLayout {
        StructLayout::compute(
            0,
            None,
            fields
                .iter()
                .map(|(n, t)| (n.to_string(), t.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(CType::Int.size(), 4);
        assert_eq!(CType::Char.size(), 1);
        assert_eq!(CType::pointer_to(CType::Char).size(), 8);
        assert_eq!(CType::pointer_to(CType::Int).align(), 8);
    }

    #[test]
    fn test_multi_dimensional_array_sizes() {
        // int x[3][4]
        let row = CType::array_of(CType::Int, 4);
        let x = CType::array_of(row.clone(), 3);
        assert_eq!(x.size(), 48);
        assert_eq!(x.pointee().map(CType::size), Some(16));
        assert_eq!(row.pointee().map(CType::size), Some(4));
        assert_eq!(x.align(), 4);
    }

    #[test]
    fn test_struct_padding() {
        let s = layout(&[("a", CType::Char), ("b", CType::Int), ("c", CType::Char)]);
        assert_eq!(s.size, 12);
        assert_eq!(s.align, 4);
        assert_eq!(s.field("a").map(|f| f.offset), Some(0));
        assert_eq!(s.field("b").map(|f| f.offset), Some(4));
        assert_eq!(s.field("c").map(|f| f.offset), Some(8));

        assert_eq!(layout(&[("a", CType::Char), ("b", CType::Char)]).size, 2);
        assert_eq!(layout(&[("a", CType::Char), ("b", CType::Int)]).size, 8);
        assert_eq!(layout(&[("a", CType::Int), ("b", CType::Char)]).size, 8);
    }

    #[test]
    fn test_empty_struct() {
        let s = layout(&[]);
        assert_eq!(s.size, 0);
        assert_eq!(s.align, 1);
    }

    #[test]
    fn test_struct_with_array_and_pointer_fields() {
        let s = layout(&[
            ("a", CType::array_of(CType::Char, 3)),
            ("p", CType::pointer_to(CType::Int)),
        ]);
        assert_eq!(s.field("p").map(|f| f.offset), Some(8));
        assert_eq!(s.size, 16);

        let arr = CType::array_of(CType::Struct(Rc::new(layout(&[(
            "a",
            CType::array_of(CType::Int, 3),
        )]))), 2);
        assert_eq!(arr.size(), 24);
    }

    #[test]
    fn test_decay_and_scale() {
        let x = CType::array_of(CType::array_of(CType::Int, 3), 2);
        let decayed = x.decay();
        assert_eq!(decayed, CType::pointer_to(CType::array_of(CType::Int, 3)));
        assert_eq!(decayed.scale(), 12);
        assert_eq!(CType::Int.decay(), CType::Int);
        assert_eq!(CType::pointer_to(CType::Void).scale(), 1);
    }

    #[test]
    fn test_common_type() {
        assert_eq!(common_type(&CType::Char, &CType::Char), Some(CType::Int));
        assert_eq!(common_type(&CType::Int, &CType::pointer_to(CType::Int)), None);
    }

    #[test]
    fn test_struct_identity_is_per_definition() {
        let a = StructLayout::compute(1, None, vec![("x".to_string(), CType::Int)]);
        let b = StructLayout::compute(2, None, vec![("x".to_string(), CType::Int)]);
        assert_ne!(CType::Struct(Rc::new(a.clone())), CType::Struct(Rc::new(b)));
        assert_eq!(CType::Struct(Rc::new(a.clone())), CType::Struct(Rc::new(a)));
    }
}
