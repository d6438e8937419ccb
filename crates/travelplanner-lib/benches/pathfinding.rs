use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use std::hint::black_box;
use travelplanner_lib::{build_graph, k_shortest_distinct_paths, shortest_path, Dataset, Graph};

static GRAPH: Lazy<Graph> = Lazy::new(|| {
    let dataset = Dataset::builtin().expect("builtin dataset");
    build_graph(&dataset).expect("graph builds")
});

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*GRAPH;

    c.bench_function("dijkstra_doon_university_graphic_era", |b| {
        b.iter(|| {
            let result = shortest_path(
                graph,
                black_box("Doon University"),
                black_box("Graphic Era University"),
            );
            black_box(result.cost)
        });
    });

    c.bench_function("alternatives_fri_sahastradhara", |b| {
        b.iter(|| {
            let routes = k_shortest_distinct_paths(
                graph,
                black_box("Forest Research Institute"),
                black_box("Sahastradhara"),
                3,
            );
            black_box(routes.len())
        });
    });

    c.bench_function("build_graph_builtin", |b| {
        let dataset = Dataset::builtin().expect("builtin dataset");
        b.iter(|| black_box(build_graph(&dataset).expect("graph builds").edge_count()));
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
