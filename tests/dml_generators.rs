use tablesync::{
    BindStyle, ColumnMapping, DmlGenerator, SqlStmtTxtBatcher, SqlValue, StatementGeneratorConfig, SyncError,
};

fn keys_and_others() -> StatementGeneratorConfig {
    StatementGeneratorConfig::builder()
        .table("t2")
        .key("col1", "a")
        .key("col2", "b")
        .other("col3", "c")
        .build()
        .unwrap()
}

fn all_generators(cfg: &StatementGeneratorConfig) -> Vec<(&'static str, Box<dyn SqlStmtTxtBatcher>, usize)> {
    let dml = DmlGenerator::default();
    let arity_all = cfg.key_columns.len() + cfg.other_columns.len();
    vec![
        ("insert", dml.new_insert_generator(cfg).unwrap(), arity_all),
        ("update", dml.new_update_generator(cfg).unwrap(), arity_all),
        ("delete", dml.new_delete_generator(cfg).unwrap(), cfg.key_columns.len()),
        ("merge", dml.new_merge_generator(cfg).unwrap(), arity_all),
    ]
}

fn row(width: usize, seed: i64) -> Vec<SqlValue> {
    (0..width as i64).map(|i| SqlValue::Int64(seed * 10 + i)).collect()
}

#[test]
fn test_insert_example() {
    let mut gen = DmlGenerator::default()
        .new_insert_generator(&keys_and_others())
        .unwrap();
    gen.init_batch(2);
    gen.add_values_to_batch(vec!["x".into(), "y".into(), 123.into()])
        .unwrap();
    gen.add_values_to_batch(vec!["p".into(), "q".into(), 2.into()])
        .unwrap();

    assert_eq!(
        gen.statement(),
        "insert into t2 (a,b,c) values ( :1,:2,:3 ),( :4,:5,:6 )"
    );
    assert_eq!(
        gen.values(),
        &[
            SqlValue::from("x"),
            SqlValue::from("y"),
            SqlValue::from(123),
            SqlValue::from("p"),
            SqlValue::from("q"),
            SqlValue::from(2),
        ]
    );
}

#[test]
fn test_delete_example() {
    let cfg = StatementGeneratorConfig::builder()
        .table("t2")
        .key("key1", "a")
        .key("key2", "b")
        .build()
        .unwrap();
    let mut gen = DmlGenerator::default().new_delete_generator(&cfg).unwrap();
    gen.init_batch(2);
    gen.add_values_to_batch(vec!["x".into(), "y".into()]).unwrap();
    gen.add_values_to_batch(vec!["p".into(), "q".into()]).unwrap();

    assert_eq!(
        gen.statement(),
        "delete from t2 tgt using (select :1 as a,:2 as b union all select :3,:4) src \
         where src.a = tgt.a and src.b = tgt.b"
    );
}

#[test]
fn test_merge_example() {
    let mut gen = DmlGenerator::default()
        .new_merge_generator(&keys_and_others())
        .unwrap();
    gen.init_batch(1);
    gen.add_values_to_batch(vec!["a".into(), "b".into(), 456.into()])
        .unwrap();

    let sql = gen.statement();
    assert!(sql.contains("on (S.a = T.a,S.b = T.b)"), "{}", sql);
    assert!(
        sql.contains("when not matched then insert (a,b,c) values (s.a,s.b,s.c)"),
        "{}",
        sql
    );
    assert_eq!(
        gen.values(),
        &[SqlValue::from("a"), SqlValue::from("b"), SqlValue::from(456)]
    );
}

#[test]
fn test_full_batch_invariant_for_every_generator() {
    let cfg = keys_and_others();
    for (name, mut gen, arity) in all_generators(&cfg) {
        gen.init_batch(3);
        for i in 0..2 {
            assert!(
                !gen.add_values_to_batch(row(arity, i)).unwrap(),
                "{}: row {} reported full too early",
                name,
                i
            );
        }
        assert!(gen.add_values_to_batch(row(arity, 2)).unwrap(), "{}", name);
        assert!(
            matches!(
                gen.add_values_to_batch(row(arity, 3)),
                Err(SyncError::BatchFull { capacity: 3 })
            ),
            "{}: fourth row should not fit",
            name
        );
        assert_eq!(gen.values().len(), 3 * arity, "{}", name);
    }
}

#[test]
fn test_bind_count_invariant_for_every_generator() {
    let cfg = keys_and_others();
    for (name, mut gen, arity) in all_generators(&cfg) {
        gen.init_batch(5);
        for wrong in [arity - 1, arity + 1] {
            match gen.add_values_to_batch(row(wrong, 0)) {
                Err(SyncError::ArgumentCount { expected, actual }) => {
                    assert_eq!(expected, arity, "{}", name);
                    assert_eq!(actual, wrong, "{}", name);
                }
                other => panic!("{}: expected ArgumentCount, got {:?}", name, other),
            }
        }
        assert!(gen.values().is_empty(), "{}", name);
        gen.add_values_to_batch(row(arity, 1)).unwrap();
        assert_eq!(gen.values().len(), arity, "{}", name);
    }
}

#[test]
fn test_column_order_follows_insertion_order() {
    let cfg = StatementGeneratorConfig::builder()
        .table("t")
        .key("z", "k2")
        .key("a", "k1")
        .other("y", "o2")
        .other("b", "o1")
        .build()
        .unwrap();
    let dml = DmlGenerator::default();

    let mut insert = dml.new_insert_generator(&cfg).unwrap();
    insert.init_batch(1);
    insert.add_values_to_batch(row(4, 0)).unwrap();
    assert!(insert.statement().starts_with("insert into t (k2,k1,o2,o1) values"));

    let mut update = dml.new_update_generator(&cfg).unwrap();
    update.init_batch(1);
    update.add_values_to_batch(row(4, 0)).unwrap();
    assert_eq!(
        update.statement(),
        "update t tgt set tgt.o2 = src.o2,tgt.o1 = src.o1 from \
         (select :1 as k2,:2 as k1,:3 as o2,:4 as o1) src \
         where src.k2 = tgt.k2 and src.k1 = tgt.k1"
    );

    let mut delete = dml.new_delete_generator(&cfg).unwrap();
    delete.init_batch(1);
    delete.add_values_to_batch(row(2, 0)).unwrap();
    assert!(delete
        .statement()
        .ends_with("where src.k2 = tgt.k2 and src.k1 = tgt.k1"));

    let mut merge = dml.new_merge_generator(&cfg).unwrap();
    merge.init_batch(1);
    merge.add_values_to_batch(row(4, 0)).unwrap();
    let sql = merge.statement();
    assert!(sql.contains("on (S.k2 = T.k2,S.k1 = T.k1)"), "{}", sql);
    assert!(sql.contains("update set T.o2 = S.o2,T.o1 = S.o1"), "{}", sql);
    assert!(sql.contains("insert (k2,k1,o2,o1) values (s.k2,s.k1,s.o2,s.o1)"), "{}", sql);
}

#[test]
fn test_statement_is_stable_between_calls() {
    let cfg = keys_and_others();
    for (name, mut gen, arity) in all_generators(&cfg) {
        gen.init_batch(2);
        gen.add_values_to_batch(row(arity, 0)).unwrap();
        gen.add_values_to_batch(row(arity, 1)).unwrap();
        let first = gen.statement();
        let second = gen.statement();
        assert_eq!(first, second, "{}", name);

        // Re-initialising with the same capacity gives the same text.
        gen.init_batch(2);
        gen.add_values_to_batch(row(arity, 2)).unwrap();
        gen.add_values_to_batch(row(arity, 3)).unwrap();
        assert_eq!(gen.statement(), first, "{}", name);
        assert_eq!(gen.values()[0], SqlValue::Int64(20), "{}", name);
    }
}

#[test]
fn test_capacity_change_re_renders() {
    let mut gen = DmlGenerator::default()
        .new_insert_generator(&keys_and_others())
        .unwrap();
    gen.init_batch(2);
    gen.add_values_to_batch(row(3, 0)).unwrap();
    gen.add_values_to_batch(row(3, 1)).unwrap();
    assert_eq!(
        gen.statement(),
        "insert into t2 (a,b,c) values ( :1,:2,:3 ),( :4,:5,:6 )"
    );

    gen.init_batch(1);
    gen.add_values_to_batch(row(3, 2)).unwrap();
    assert_eq!(gen.statement(), "insert into t2 (a,b,c) values ( :1,:2,:3 )");
}

#[test]
fn test_merge_and_insert_numbering_differ() {
    let cfg = keys_and_others();
    let dml = DmlGenerator::default();

    let mut merge = dml.new_merge_generator(&cfg).unwrap();
    merge.init_batch(2);
    merge.add_values_to_batch(row(3, 0)).unwrap();
    merge.add_values_to_batch(row(3, 1)).unwrap();
    assert!(merge
        .statement()
        .contains("select :0 as a,:1 as b,:2 as c from dual union all select :3,:4,:5 from dual"));

    let mut update = dml.new_update_generator(&cfg).unwrap();
    update.init_batch(2);
    update.add_values_to_batch(row(3, 0)).unwrap();
    update.add_values_to_batch(row(3, 1)).unwrap();
    assert!(update
        .statement()
        .contains("select :1 as a,:2 as b,:3 as c union all select :4,:5,:6"));
}

#[test]
fn test_schema_qualified_target() {
    let cfg = StatementGeneratorConfig::builder()
        .table("stage.t2")
        .key("col1", "a")
        .build()
        .unwrap();
    let mut gen = DmlGenerator::new(BindStyle::Dollar)
        .new_delete_generator(&cfg)
        .unwrap();
    gen.init_batch(1);
    gen.add_values_to_batch(vec!["x".into()]).unwrap();
    assert_eq!(
        gen.statement(),
        "delete from stage.t2 tgt using (select $1 as a) src where src.a = tgt.a"
    );
}

#[test]
fn test_missing_configuration_fails_at_construction() {
    let no_keys = StatementGeneratorConfig::builder()
        .table("t2")
        .other("col3", "c")
        .build()
        .unwrap();
    let dml = DmlGenerator::default();
    assert!(dml.new_insert_generator(&no_keys).is_ok());
    assert!(matches!(
        dml.new_update_generator(&no_keys),
        Err(SyncError::MissingConfiguration(_))
    ));
    assert!(matches!(
        dml.new_delete_generator(&no_keys),
        Err(SyncError::MissingConfiguration(_))
    ));
    assert!(matches!(
        dml.new_merge_generator(&no_keys),
        Err(SyncError::MissingConfiguration(_))
    ));
}

#[test]
fn test_config_built_from_fields_without_table_is_rejected() {
    let cfg = StatementGeneratorConfig {
        output_schema: String::new(),
        schema_separator: String::new(),
        output_table: String::new(),
        key_columns: vec![("col1", "a")].into_iter().collect(),
        other_columns: vec![("col3", "c")].into_iter().collect(),
    };
    let dml = DmlGenerator::default();
    assert!(matches!(
        dml.new_insert_generator(&cfg),
        Err(SyncError::MissingConfiguration(_))
    ));
    assert!(matches!(
        dml.new_update_generator(&cfg),
        Err(SyncError::MissingConfiguration(_))
    ));
    assert!(matches!(
        dml.new_delete_generator(&cfg),
        Err(SyncError::MissingConfiguration(_))
    ));
    assert!(matches!(
        dml.new_merge_generator(&cfg),
        Err(SyncError::MissingConfiguration(_))
    ));

    let blank = StatementGeneratorConfig {
        output_table: "   ".to_string(),
        ..cfg.clone()
    };
    assert!(matches!(
        dml.new_insert_generator(&blank),
        Err(SyncError::MissingConfiguration(_))
    ));
}

#[test]
fn test_config_built_from_fields_with_overlap_is_rejected() {
    let mut keys = ColumnMapping::new();
    keys.push("id", "id");
    let cfg = StatementGeneratorConfig {
        output_schema: String::new(),
        schema_separator: String::new(),
        output_table: "t2".to_string(),
        key_columns: keys.clone(),
        other_columns: keys,
    };
    assert!(matches!(
        DmlGenerator::default().new_merge_generator(&cfg),
        Err(SyncError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_empty_batch_renders_no_statement() {
    let cfg = keys_and_others();
    for (name, mut gen, arity) in all_generators(&cfg) {
        gen.init_batch(4);
        assert_eq!(gen.statement(), "", "{}", name);
        assert!(gen.values().is_empty(), "{}", name);

        gen.add_values_to_batch(row(arity, 0)).unwrap();
        assert!(!gen.statement().is_empty(), "{}", name);
    }
}

#[test]
fn test_huge_capacity_does_not_preallocate() {
    let cfg = keys_and_others();
    for (name, mut gen, arity) in all_generators(&cfg) {
        gen.init_batch(usize::MAX);
        assert!(!gen.add_values_to_batch(row(arity, 0)).unwrap(), "{}", name);
        assert_eq!(gen.values().len(), arity, "{}", name);
    }
}
