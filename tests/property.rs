mod property {
    pub mod trees;
    mod predicate;
    mod query;
}
