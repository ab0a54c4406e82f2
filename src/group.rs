//! Group Expansion
//!
//! A group is an object path prefix plus member suffixes. Expanding it
//! against an interface and property gives one [`Member`] per suffix, in
//! catalog order. That order drives every per-member signal downstream.

use crate::documents::{value_text, GroupDef, PropertyDescriptor};
use crate::ir::Member;

pub fn expand(group: &GroupDef, interface: &str, property: &PropertyDescriptor) -> Vec<Member> {
    group
        .members
        .iter()
        .map(|suffix| Member {
            object: format!("{}{}", group.ty, suffix),
            interface: interface.to_string(),
            property: property.name.clone(),
            ty: property.ty.clone(),
            value: property.value.as_ref().map(value_text),
        })
        .collect()
}
