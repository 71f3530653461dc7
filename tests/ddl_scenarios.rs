//! End-to-end DDL generation scenarios
//!
//! Each test runs a change set through `DdlGenerator` (or a `MigrationBatch`)
//! and checks the statements written to the five output channels.

use moorings::{
    AddColumn, AlterColumn, ChangeSet, Column, DdlGenerator, DdlWrite, ForeignKey, IdType,
    Operation, Platform, SchemaModel, Table,
};

// ============================================================================
// Helpers
// ============================================================================

fn customer() -> Table {
    Table::new("customer")
        .column(Column::new("id", "integer").primary_key())
        .column(Column::new("name", "varchar(40)").unique("uq_customer_name"))
        .column(Column::new("status", "varchar(1)").not_null())
        .identity_type(IdType::Identity)
}

fn generate(platform: Platform, model: &mut SchemaModel, operations: Vec<Operation>) -> DdlWrite {
    DdlGenerator::new(platform)
        .generate(model, &ChangeSet::new(operations))
        .expect("generation succeeds")
}

fn count_prefix(statements: &[String], prefix: &str) -> usize {
    statements.iter().filter(|s| s.starts_with(prefix)).count()
}

// ============================================================================
// Create table
// ============================================================================

#[test]
fn test_customer_create_table() {
    let mut model = SchemaModel::new();
    let write = generate(Platform::Postgres, &mut model, vec![Operation::CreateTable(customer())]);

    let apply = write.apply_buffer().statements();
    assert_eq!(apply.len(), 1);
    let create = &apply[0];
    assert!(create.starts_with("create table customer ("));
    let column_lines = create
        .lines()
        .filter(|l| l.starts_with("  ") && !l.trim_start().starts_with("constraint"))
        .count();
    assert_eq!(column_lines, 3);
    assert!(create.contains("constraint uq_customer_name unique (name)"));
    assert!(create.contains("constraint pk_customer primary key (id)"));

    assert_eq!(write.rollback_buffer().statements(), &["drop table if exists customer cascade"]);
    assert!(write.drop_buffer().is_empty());
}

#[test]
fn test_identity_forms_per_platform() {
    let expected = [
        (Platform::Postgres, "serial not null"),
        (Platform::MySql, "integer auto_increment not null"),
        (Platform::SqlServer, "integer identity(1,1) not null"),
        (Platform::Oracle, "number(10) generated by default as identity not null"),
    ];
    for (platform, id_line) in expected {
        let mut model = SchemaModel::new();
        let write = generate(platform, &mut model, vec![Operation::CreateTable(customer())]);
        let create = &write.apply_buffer().statements()[0];
        assert!(create.contains(id_line), "{}: {}", platform, create);
        assert!(write.apply_buffer().position("create sequence").is_none());
    }
}

#[test]
fn test_sequence_created_after_table_and_dropped_after_table() {
    let table = Table::new("invoice")
        .column(Column::new("id", "bigint").primary_key())
        .identity_type(IdType::Sequence);

    for platform in [Platform::Postgres, Platform::Oracle, Platform::SqlServer] {
        let mut model = SchemaModel::new();
        let write = generate(platform, &mut model, vec![Operation::CreateTable(table.clone())]);

        let apply = write.apply_buffer();
        let create_table = apply.position("create table invoice").unwrap();
        let create_sequence = apply.position("create sequence invoice_seq").unwrap();
        assert!(create_table < create_sequence, "{}", platform);

        let rollback = write.rollback_buffer();
        let drop_table = rollback.position("drop table").unwrap();
        let drop_sequence = rollback.position("drop sequence").unwrap();
        assert!(drop_table < drop_sequence, "{}", platform);
    }

    // no sequences on MySQL: identity instead
    let mut model = SchemaModel::new();
    let write = generate(Platform::MySql, &mut model, vec![Operation::CreateTable(table)]);
    assert!(write.apply_buffer().statements()[0].contains("bigint auto_increment not null"));
    assert!(write.apply_buffer().position("create sequence").is_none());
}

#[test]
fn test_composite_primary_key_never_generated() {
    let table = Table::new("order_line")
        .column(Column::new("order_id", "bigint").primary_key())
        .column(Column::new("line_no", "integer").primary_key())
        .identity_type(IdType::Sequence);

    for platform in Platform::ALL {
        let mut model = SchemaModel::new();
        let write = generate(platform, &mut model, vec![Operation::CreateTable(table.clone())]);
        let script = write.full_script();
        assert!(!script.contains("sequence"), "{}", platform);
        assert!(!script.contains("identity"), "{}", platform);
        assert!(!script.contains("serial"), "{}", platform);
        assert!(!script.contains("auto_increment"), "{}", platform);
    }
}

#[test]
fn test_create_with_history_tears_down_before_drop_table() {
    let table = customer().with_history();
    let mut model = SchemaModel::new();
    let write = generate(Platform::Postgres, &mut model, vec![Operation::CreateTable(table)]);

    let apply = write.apply_buffer();
    assert!(apply.position("create table customer (").unwrap() < apply.position("create table customer_history").unwrap());

    let rollback = write.rollback_buffer();
    assert!(
        rollback.position("drop table if exists customer_history").unwrap()
            < rollback.position("drop table if exists customer cascade").unwrap()
    );
}

#[test]
fn test_compound_unique_and_foreign_key() {
    let line = Table::new("order_line")
        .column(Column::new("order_id", "bigint").primary_key())
        .column(Column::new("line_no", "integer").primary_key());
    let shipment = Table::new("shipment")
        .column(Column::new("id", "bigint").primary_key())
        .column(Column::new("order_id", "bigint"))
        .column(Column::new("line_no", "integer"))
        .unique_constraint("uq_shipment_line", &["order_id", "line_no"])
        .foreign_key(ForeignKey::new(
            "fk_shipment_line",
            &["order_id", "line_no"],
            "order_line",
            &["order_id", "line_no"],
        ));

    let mut model = SchemaModel::new();
    let write = generate(
        Platform::Postgres,
        &mut model,
        vec![Operation::CreateTable(line), Operation::CreateTable(shipment)],
    );

    let create = write.apply_buffer().statements()[1].clone();
    assert!(create.contains("constraint uq_shipment_line unique (order_id,line_no)"));
    assert_eq!(
        write.apply_foreign_keys_buffer().statements(),
        &["alter table shipment add constraint fk_shipment_line foreign key (order_id,line_no) references order_line (order_id,line_no) on delete restrict on update restrict"]
    );
    assert_eq!(
        write.rollback_foreign_keys_buffer().statements(),
        &["alter table shipment drop constraint if exists fk_shipment_line"]
    );
}

// ============================================================================
// Add / drop column
// ============================================================================

#[test]
fn test_add_column_with_history() {
    let mut model = SchemaModel::from_tables([customer().with_history()]);
    let generator = DdlGenerator::new(Platform::Postgres);
    let mut batch = generator.batch(&mut model);
    batch
        .generate(&Operation::AddColumn(AddColumn {
            table_name: "customer".into(),
            columns: vec![Column::new("age", "integer").not_null().check("ck_customer_age", "age >= 0")],
            with_history: true,
        }))
        .unwrap();
    assert!(batch.tracker().contains("customer"));
    let write = batch.finish();

    let apply = write.apply_buffer().statements();
    assert_eq!(count_prefix(apply, "alter table customer add column age"), 1);
    assert_eq!(count_prefix(apply, "alter table customer_history add column age"), 1);
    let base = apply.iter().find(|s| s.starts_with("alter table customer add column")).unwrap();
    assert_eq!(base, "alter table customer add column age integer not null constraint ck_customer_age check (age >= 0)");
    let history = apply.iter().find(|s| s.starts_with("alter table customer_history add column")).unwrap();
    assert_eq!(history, "alter table customer_history add column age integer");

    let rollback = write.rollback_buffer().statements();
    assert_eq!(count_prefix(rollback, "alter table customer drop column age"), 1);
    assert_eq!(count_prefix(rollback, "alter table customer_history drop column age"), 1);

    // trigger function regenerated once, with the new column
    assert_eq!(count_prefix(apply, "create or replace function customer_history_version"), 1);
}

#[test]
fn test_drop_column_deferred_to_drop_script() {
    let mut model = SchemaModel::from_tables([customer()]);
    let write = generate(
        Platform::MySql,
        &mut model,
        vec![Operation::DropColumn(moorings::DropColumn {
            table_name: "customer".into(),
            column_name: "status".into(),
            with_history: false,
        })],
    );
    assert!(write.apply_script().is_empty());
    assert_eq!(write.drop_script(), "alter table customer drop column status;\n\n");
    assert!(model.table("customer").unwrap().find_column("status").is_none());
}

#[test]
fn test_column_changes_on_table_outside_the_model() {
    let mut model = SchemaModel::new();
    let write = generate(
        Platform::Postgres,
        &mut model,
        vec![
            Operation::AddColumn(AddColumn {
                table_name: "customer".into(),
                columns: vec![Column::new("age", "integer")],
                with_history: false,
            }),
            Operation::AlterColumn({
                let mut alter = AlterColumn::new("customer", "name");
                alter.notnull = Some(true);
                alter
            }),
            Operation::DropColumn(moorings::DropColumn {
                table_name: "customer".into(),
                column_name: "fax".into(),
                with_history: false,
            }),
        ],
    );

    assert_eq!(
        write.apply_script(),
        "alter table customer add column age integer;\n\n\
         alter table customer alter column name set not null;\n"
    );
    assert_eq!(write.drop_script(), "alter table customer drop column fax;\n\n");
    assert!(model.is_empty());
}

#[test]
fn test_add_column_groups_are_separated() {
    let mut model = SchemaModel::from_tables([customer()]);
    let write = generate(
        Platform::Postgres,
        &mut model,
        vec![Operation::AddColumn(AddColumn {
            table_name: "customer".into(),
            columns: vec![
                Column::new("age", "integer"),
                Column::new("region_id", "bigint").references("region.id", None, None),
            ],
            with_history: false,
        })],
    );

    assert!(write.apply_buffer().as_str().ends_with("region_id bigint;\n\n"));
    assert!(write.rollback_buffer().as_str().ends_with("drop column region_id;\n\n"));
    assert!(write.apply_foreign_keys_buffer().as_str().ends_with("(region_id);\n\n"));
}

// ============================================================================
// Alter column
// ============================================================================

#[test]
fn test_alter_column_drop_unique_then_add_unique() {
    let mut alter = AlterColumn::new("customer", "status");
    alter.drop_unique = Some("uq_old".into());
    alter.unique = Some("uq_new".into());

    for platform in Platform::ALL {
        let mut model = SchemaModel::from_tables([customer()]);
        let write = generate(platform, &mut model, vec![Operation::AlterColumn(alter.clone())]);
        let apply = write.apply_buffer().statements();

        let drop = apply.iter().position(|s| s.contains("uq_old")).expect("drop unique");
        let add = apply.iter().position(|s| s.contains("uq_new")).expect("add unique");
        assert!(drop < add, "{}", platform);

        let rollback_fk = write.rollback_foreign_keys_buffer().statements();
        assert_eq!(rollback_fk.iter().filter(|s| s.contains("uq_new")).count(), 1, "{}", platform);
    }
}

#[test]
fn test_drop_unique_declared_inline_drops_the_constraint() {
    let mut alter = AlterColumn::new("customer", "name");
    alter.drop_unique = Some("uq_customer_name".into());

    let expected = [
        (Platform::Postgres, "alter table customer drop constraint if exists uq_customer_name"),
        (Platform::Oracle, "alter table customer drop constraint uq_customer_name"),
        (Platform::MySql, "drop index uq_customer_name on customer"),
    ];
    for (platform, statement) in expected {
        let mut model = SchemaModel::from_tables([customer()]);
        let write = generate(platform, &mut model, vec![Operation::AlterColumn(alter.clone())]);
        assert_eq!(write.apply_buffer().statements(), &[statement], "{}", platform);
    }

    let mut model = SchemaModel::from_tables([customer()]);
    let write = generate(Platform::SqlServer, &mut model, vec![Operation::AlterColumn(alter)]);
    let statement = &write.apply_buffer().statements()[0];
    assert!(statement.contains("alter table customer drop constraint uq_customer_name"));
    assert!(statement.contains("else drop index if exists uq_customer_name on customer"));
}

#[test]
fn test_alter_column_full_order() {
    let mut alter = AlterColumn::new("orders", "customer_id");
    alter.drop_foreign_key = Some("fk_orders_old".into());
    alter.references = Some("customer.id".into());
    alter.foreign_key_name = Some("fk_orders_customer".into());
    alter.column_type = Some("bigint".into());
    alter.current_type = Some("integer".into());
    alter.default_value = Some("0".into());
    alter.notnull = Some(true);

    let mut model = SchemaModel::from_tables([Table::new("orders")
        .column(Column::new("id", "bigint").primary_key())
        .column(Column::new("customer_id", "integer"))]);
    let write = generate(Platform::Postgres, &mut model, vec![Operation::AlterColumn(alter)]);

    assert_eq!(
        write.apply_foreign_keys_buffer().statements(),
        &[
            "alter table orders add constraint fk_orders_customer foreign key (customer_id) references customer (id) on delete restrict on update restrict",
            "create index ix_orders_customer_id on orders (customer_id)",
        ]
    );
    assert_eq!(
        write.apply_buffer().statements(),
        &[
            "alter table orders drop constraint if exists fk_orders_old",
            "alter table orders alter column customer_id type bigint",
            "alter table orders alter column customer_id set default 0",
            "alter table orders alter column customer_id set not null",
        ]
    );
    assert_eq!(
        write.rollback_buffer().statements(),
        &[
            "alter table orders alter column customer_id type integer",
            "alter table orders alter column customer_id drop default",
            "alter table orders alter column customer_id drop not null",
        ]
    );

    // the old foreign key is gone before the column type changes
    let script = write.apply_script();
    let drop = script.find("drop constraint if exists fk_orders_old").unwrap();
    let retype = script.find("type bigint").unwrap();
    assert!(drop < retype, "{}", script);
}

#[test]
fn test_mysql_alter_type_and_default_in_one_statement() {
    let mut model = SchemaModel::from_tables([Table::new("customer")
        .column(Column::new("id", "bigint").primary_key())
        .column(Column::new("status", "varchar(1)").not_null().default_value("'N'"))]);

    let mut alter = AlterColumn::new("customer", "status");
    alter.column_type = Some("varchar(3)".into());
    alter.default_value = Some("'A'".into());
    let write = generate(Platform::MySql, &mut model, vec![Operation::AlterColumn(alter)]);

    assert_eq!(
        write.apply_buffer().statements(),
        &["alter table customer modify status varchar(3) default 'A' not null"]
    );
    assert_eq!(
        write.rollback_buffer().statements(),
        &["alter table customer modify status varchar(1) default 'N' not null"]
    );

    // a type-only change keeps the default the model knows about
    let mut alter = AlterColumn::new("customer", "status");
    alter.column_type = Some("varchar(5)".into());
    let write = generate(Platform::MySql, &mut model, vec![Operation::AlterColumn(alter)]);
    assert_eq!(
        write.apply_buffer().statements(),
        &["alter table customer modify status varchar(5) default 'A' not null"]
    );
}

#[test]
fn test_failed_alter_leaves_batch_output_untouched() {
    let mut model = SchemaModel::from_tables([Table::new("orders")
        .column(Column::new("id", "bigint").primary_key())
        .column(Column::new("customer_id", "bigint"))]);
    let generator = DdlGenerator::new(Platform::Postgres);
    let mut batch = generator.batch(&mut model);

    let mut alter = AlterColumn::new("orders", "customer_id");
    alter.drop_foreign_key = Some("fk_orders_old".into());
    alter.column_type = Some("integer".into());
    alter.references = Some("customer".into());
    let result = batch.generate(&Operation::AlterColumn(alter));

    assert!(matches!(result, Err(moorings::DdlError::MalformedReference { .. })));
    assert!(batch.write().is_empty());
}

#[test]
fn test_alter_column_type_on_history_table() {
    let mut alter = AlterColumn::new("customer", "name");
    alter.column_type = Some("varchar(80)".into());

    let mut model = SchemaModel::from_tables([customer().with_history()]);
    let write = generate(Platform::MySql, &mut model, vec![Operation::AlterColumn(alter)]);

    assert_eq!(
        write.apply_buffer().statements(),
        &[
            "alter table customer modify name varchar(80)",
            "alter table customer_history modify name varchar(80)",
        ]
    );
    assert_eq!(
        write.rollback_buffer().statements(),
        &[
            "alter table customer modify name varchar(40)",
            "alter table customer_history modify name varchar(40)",
        ]
    );
}

// ============================================================================
// Structural properties
// ============================================================================

#[test]
fn test_foreign_keys_pair_with_rollback() {
    let orders = Table::new("orders")
        .column(Column::new("id", "bigint").primary_key())
        .column(Column::new("customer_id", "bigint").references("customer.id", None, None))
        .column(Column::new("billing_id", "bigint").references("address.id", None, None))
        .column(
            Column::new("shipping_id", "bigint")
                .unique("uq_orders_shipping_id")
                .references("address.id", None, None),
        );

    for platform in Platform::ALL {
        let mut model = SchemaModel::new();
        let write = generate(platform, &mut model, vec![Operation::CreateTable(orders.clone())]);

        let apply_fk = write.apply_foreign_keys_buffer().statements();
        let rollback_fk = write.rollback_foreign_keys_buffer().statements();
        let add_fks = apply_fk.iter().filter(|s| s.contains("foreign key")).count();
        let indexes = count_prefix(apply_fk, "create index");
        assert_eq!(add_fks, 3, "{}", platform);
        // shipping_id is covered by its unique constraint
        assert_eq!(indexes, 2, "{}", platform);
        assert_eq!(rollback_fk.len(), add_fks + indexes, "{}", platform);
        assert_eq!(count_prefix(rollback_fk, "drop index"), indexes, "{}", platform);
    }
}

#[test]
fn test_round_trip_restores_shape() {
    let operations = vec![
        Operation::CreateTable(customer().with_history()),
        Operation::CreateTable(
            Table::new("orders")
                .column(Column::new("id", "bigint").primary_key())
                .column(Column::new("customer_id", "integer").references("customer.id", None, None)),
        ),
        Operation::AddColumn(AddColumn {
            table_name: "customer".into(),
            columns: vec![Column::new("email", "varchar(120)")],
            with_history: true,
        }),
    ];

    for platform in Platform::ALL {
        let mut model = SchemaModel::new();
        let write = generate(platform, &mut model, operations.clone());
        let apply = [write.apply_buffer().statements(), write.apply_foreign_keys_buffer().statements()].concat();
        let rollback = [write.rollback_foreign_keys_buffer().statements(), write.rollback_buffer().statements()].concat();

        for table in ["customer", "orders"] {
            assert_eq!(count_prefix(&apply, &format!("create table {} (", table)), 1);
            assert!(rollback.iter().any(|s| s.starts_with("drop table") && s.contains(&format!(" {}", table))));
        }
        for added in apply.iter().filter(|s| s.starts_with("alter table") && s.contains(" email ")) {
            let table = added.split_whitespace().nth(2).unwrap();
            assert!(
                rollback.iter().any(|s| s == &format!("alter table {} drop column email", table)),
                "{}: {}",
                platform,
                added
            );
        }
        assert!(rollback.iter().any(|s| s.contains("fk_orders_customer_id")), "{}", platform);
    }
}

#[test]
fn test_generation_is_deterministic() {
    let long = "a_rather_long_table_name_for_truncation";
    let table = Table::new(long)
        .column(Column::new("id", "bigint").primary_key())
        .column(Column::new("first_reference_id", "bigint").references("customer.id", None, None))
        .column(Column::new("second_reference_id", "bigint").references("customer.id", None, None));

    let first = generate(Platform::Oracle, &mut SchemaModel::new(), vec![Operation::CreateTable(table.clone())]);
    let second = generate(Platform::Oracle, &mut SchemaModel::new(), vec![Operation::CreateTable(table)]);
    assert_eq!(first, second);

    let names: Vec<&str> = first
        .apply_foreign_keys_buffer()
        .statements()
        .iter()
        .filter(|s| s.contains("foreign key"))
        .map(|s| s.split_whitespace().nth(5).unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
    assert!(names.iter().all(|n| n.len() <= 30));
    assert!(names[0].ends_with("_01"));
    assert!(names[1].ends_with("_02"));
}

#[test]
fn test_full_script_global_order() {
    let mut model = SchemaModel::from_tables([customer()]);
    let write = generate(
        Platform::Postgres,
        &mut model,
        vec![
            Operation::CreateTable(
                Table::new("orders")
                    .column(Column::new("id", "bigint").primary_key())
                    .column(Column::new("customer_id", "integer").references("customer.id", None, None)),
            ),
            Operation::DropColumn(moorings::DropColumn {
                table_name: "customer".into(),
                column_name: "status".into(),
                with_history: false,
            }),
        ],
    );

    let full = write.full_script();
    let order = [
        "create table orders",
        "alter table orders add constraint fk_orders_customer_id",
        "alter table customer drop column status",
        "alter table orders drop constraint if exists fk_orders_customer_id",
        "drop table if exists orders cascade",
    ];
    let positions: Vec<usize> = order.iter().map(|s| full.find(s).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", full);
}
