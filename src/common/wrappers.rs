//! Zero-cost wrappers for safe indexing.

wrap_usize! {
    #[doc = "Attribute indices."]
    AttrIdx
    #[doc = "Total map from attributes to something."]
    map: AttrMap
}

wrap_usize! {
    #[doc = "Class (label) indices."]
    ClsIdx
    #[doc = "Total map from classes to something."]
    map: ClsMap
}
