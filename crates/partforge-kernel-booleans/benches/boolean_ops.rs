use criterion::{black_box, criterion_group, criterion_main, Criterion};
use partforge_kernel_booleans::{boolean_op, BooleanOp};
use partforge_kernel_math::{Frame, Point3, Vec3};
use partforge_kernel_primitives::{make_box, make_cylinder, make_sphere};
use partforge_kernel_tessellate::{tessellate_solid, TessellationParams, Triangle};
use partforge_kernel_topo::TopologyArena;

fn operands() -> (Vec<Triangle>, Vec<Triangle>, Vec<Triangle>) {
    let mut arena = TopologyArena::new();
    let params = TessellationParams::default();
    let block = make_box(&mut arena, Point3::origin(), 100.0, 50.0, 20.0).unwrap();
    let frame = Frame::new(Point3::new(20.0, 25.0, -1.0), Vec3::z(), Vec3::x());
    let drill = make_cylinder(&mut arena, &frame, 5.0, 22.0).unwrap();
    let ball = make_sphere(&mut arena, Point3::new(50.0, 25.0, 20.0), 15.0).unwrap();
    (
        tessellate_solid(&arena, block, &params),
        tessellate_solid(&arena, drill, &params),
        tessellate_solid(&arena, ball, &params),
    )
}

fn bench_booleans(c: &mut Criterion) {
    let (block, drill, ball) = operands();

    c.bench_function("subtract_cylinder_from_box", |b| {
        b.iter(|| boolean_op(black_box(&block), black_box(&drill), BooleanOp::Subtract))
    });
    c.bench_function("union_sphere_with_box", |b| {
        b.iter(|| boolean_op(black_box(&block), black_box(&ball), BooleanOp::Union))
    });
    c.bench_function("intersect_sphere_with_box", |b| {
        b.iter(|| boolean_op(black_box(&block), black_box(&ball), BooleanOp::Intersect))
    });
}

criterion_group!(benches, bench_booleans);
criterion_main!(benches);
