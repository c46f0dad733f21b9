use canopy_core::ir::ScopeTracker;

#[test]
fn empty_tracker_renders_empty_name() {
    let scope = ScopeTracker::new();
    assert_eq!(scope.current(), "");
    assert_eq!(scope.depth(), 0);
    assert_eq!(scope.separator(), "_");
}

#[test]
fn nested_scopes_join_outermost_first() {
    let mut scope = ScopeTracker::new();
    {
        let mut outer = scope.enter("g");
        assert_eq!(outer.current(), "g");
        {
            let inner = outer.enter("inner");
            assert_eq!(inner.current(), "g_inner");
            assert_eq!(inner.depth(), 2);
        }
        assert_eq!(outer.current(), "g");
    }
    assert_eq!(scope.current(), "");
    assert_eq!(scope.depth(), 0);
}

#[test]
fn empty_name_enters_nothing() {
    let mut scope = ScopeTracker::new();
    let mut outer = scope.enter("g");
    {
        let unnamed = outer.enter("");
        assert_eq!(unnamed.depth(), 1);
        assert_eq!(unnamed.current(), "g");
    }
    // Dropping the unnamed guard must not pop `g`.
    assert_eq!(outer.current(), "g");
    assert_eq!(outer.depth(), 1);
}

#[test]
fn custom_separator_is_used() {
    let mut scope = ScopeTracker::with_separator("::");
    let mut a = scope.enter("a");
    let b = a.enter("b");
    assert_eq!(b.current(), "a::b");
}

#[test]
fn guard_exits_on_early_return() {
    fn fails_inside(scope: &mut ScopeTracker) -> Result<(), String> {
        let guard = scope.enter("failing");
        if guard.depth() > 0 {
            return Err("boom".to_string());
        }
        Ok(())
    }

    let mut scope = ScopeTracker::new();
    assert!(fails_inside(&mut scope).is_err());
    assert_eq!(scope.depth(), 0);
}
