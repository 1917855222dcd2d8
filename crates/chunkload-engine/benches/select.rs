use chunkload_engine::{ColumnMap, EntityTable, Row, select};
use chunkload_query::{Filter, Select, Value};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const ENTITIES: usize = 50_000;

fn build_table() -> (EntityTable, ColumnMap) {
    let columns = ColumnMap::new(["id", "name", "lat", "lon"]).unwrap();
    let prefixes = ["Za", "Ma", "Ha", "Lin", "Wash"];
    let mut table = EntityTable::new();
    for i in 0..ENTITIES {
        let id = format!("{i:06}");
        let name = format!("{} School {i}", prefixes[i % prefixes.len()]);
        let row = Row::from(vec![
            Value::from(id.as_str()),
            Value::from(name),
            Value::Number(30.0 + (i % 100) as f64 / 10.0),
            Value::Number(-120.0 + (i % 50) as f64 / 10.0),
        ]);
        table.insert(id, row);
    }
    (table, columns)
}

fn bench_select(c: &mut Criterion) {
    let (table, columns) = build_table();

    c.bench_function("select/unrestricted", |b| {
        b.iter(|| select(black_box(&table), &columns, &Select::all()).unwrap())
    });

    let prefix = Select::all().filter(Filter::starts_with("name", "Za"));
    c.bench_function("select/prefix", |b| {
        b.iter(|| select(black_box(&table), &columns, &prefix).unwrap())
    });

    let projected = Select::all()
        .columns(["id", "name"])
        .filter(Filter::starts_with("name", "Wash"));
    c.bench_function("select/prefix_projected", |b| {
        b.iter(|| select(black_box(&table), &columns, &projected).unwrap())
    });
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
