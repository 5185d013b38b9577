use criterion::{criterion_group, criterion_main, Criterion};
use twocol::{TcVm, TcVmConfig, TcVmError};

pub fn load_vm_benchmark(c: &mut Criterion) {
    c.bench_function("load vm", |b| {
        b.iter(|| -> Result<(), TcVmError> {
            TcVm::new(TcVmConfig::suppressed("tc/hello_world.tc"))?;

            Ok(())
        })
    });
}

pub fn reset_vm_benchmark(c: &mut Criterion) {
    let mut vm = TcVm::new(TcVmConfig::suppressed("tc/hello_world.tc")).unwrap();
    c.bench_function("reset vm", |b| {
        b.iter(|| {
            vm.reset();
        })
    });
}

pub fn hello_world_benchmark(c: &mut Criterion) {
    let mut vm = TcVm::new(TcVmConfig::suppressed("tc/hello_world.tc")).unwrap();
    c.bench_function("hello world", |b| {
        b.iter(|| -> Result<(), TcVmError> {
            vm.run()?;
            vm.reset();

            Ok(())
        })
    });
}

pub fn countdown_benchmark(c: &mut Criterion) {
    let mut vm = TcVm::new(TcVmConfig::suppressed("tc/countdown.tc")).unwrap();
    c.bench_function("countdown", |b| {
        b.iter(|| -> Result<(), TcVmError> {
            vm.run()?;
            vm.reset();

            Ok(())
        })
    });
}

criterion_group!(
    vm,
    load_vm_benchmark,
    reset_vm_benchmark,
    hello_world_benchmark,
    countdown_benchmark,
);
criterion_main!(vm);
