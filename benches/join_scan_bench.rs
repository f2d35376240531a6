//! Throughput benchmarks for the table scan and nested-loop join operators.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::{Arc, RwLock};
use vectorquery::{
    Catalog, ColumnInfo, ColumnRefExpression, ComparisonType, ExecutionContext, ExecutionEngine,
    JoinCondition, LogicalType, PhysicalColumn, PhysicalJoinType, PhysicalNestedLoopJoin,
    PhysicalPlan, PhysicalTableScan, TableInfo, TransactionManager, Value,
};

fn populate_table(catalog: &Catalog, table_name: &str, rows: usize, modulus: i64) {
    let mut info = TableInfo::new_with_schema("main".to_string(), table_name.to_string());
    info.add_column(ColumnInfo::new("k".to_string(), LogicalType::Integer, 0))
        .unwrap();
    catalog.create_table(&info).unwrap();

    let table = catalog.get_table("main", table_name).unwrap();
    let table = table.read().unwrap();
    let data = table.get_data();
    let mut data = data.write().unwrap();
    for i in 0..rows {
        data.insert_row(&[Value::Integer((i as i64 % modulus) as i32)]).unwrap();
    }
}

fn scan_plan(table_name: &str) -> PhysicalPlan {
    PhysicalPlan::TableScan(PhysicalTableScan::new(
        table_name.to_string(),
        vec![PhysicalColumn::new("k".to_string(), LogicalType::Integer)],
    ))
}

fn bench_table_scan(c: &mut Criterion) {
    let catalog = Catalog::new();
    populate_table(&catalog, "scan_bench", 50_000, 1_000);
    let context = ExecutionContext::new(
        Arc::new(TransactionManager::new()),
        Arc::new(RwLock::new(catalog)),
    );

    c.bench_function("table_scan_50k_rows", |b| {
        b.iter(|| {
            let mut engine = ExecutionEngine::new(context.clone());
            let chunks = engine.execute_collect(scan_plan("scan_bench")).unwrap();
            black_box(chunks.iter().map(|c| c.count()).sum::<usize>())
        })
    });
}

fn bench_nested_loop_join(c: &mut Criterion) {
    let catalog = Catalog::new();
    populate_table(&catalog, "join_left", 200, 50);
    populate_table(&catalog, "join_right", 200, 50);
    let context = ExecutionContext::new(
        Arc::new(TransactionManager::new()),
        Arc::new(RwLock::new(catalog)),
    );

    let condition = JoinCondition::new(
        Arc::new(ColumnRefExpression::new(0, "k".to_string(), LogicalType::Integer)),
        Arc::new(ColumnRefExpression::new(0, "k".to_string(), LogicalType::Integer)),
        ComparisonType::Equal,
    );
    let schema = vec![
        PhysicalColumn::new("l_k".to_string(), LogicalType::Integer),
        PhysicalColumn::new("r_k".to_string(), LogicalType::Integer),
    ];
    let join = PhysicalPlan::NestedLoopJoin(PhysicalNestedLoopJoin::new(
        scan_plan("join_left"),
        scan_plan("join_right"),
        PhysicalJoinType::Inner,
        vec![condition],
        schema,
    ));

    c.bench_function("nested_loop_equi_join_200x200", |b| {
        b.iter(|| {
            let mut engine = ExecutionEngine::new(context.clone());
            let chunks = engine.execute_collect(join.clone()).unwrap();
            black_box(chunks.iter().map(|c| c.count()).sum::<usize>())
        })
    });
}

criterion_group!(benches, bench_table_scan, bench_nested_loop_join);
criterion_main!(benches);
