use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use stockpile_accounts::{Account, CreateAccount};
use stockpile_core::Locale;
use stockpile_infra::{AccountsFilter, InMemoryStore, InventoryLedger};
use stockpile_inventory::Purchase;
use stockpile_products::{CreateProduct, Product};

type Ledger = InventoryLedger<Arc<InMemoryStore>>;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

async fn seed(ledger: &Ledger, stock: i64) -> (Account, Product) {
    let account = ledger
        .create_account(CreateAccount {
            name: "Bench".to_string(),
            email: format!("bench-{}@example.com", uuid::Uuid::now_v7()),
        })
        .await
        .unwrap();
    let product = ledger
        .create_product(CreateProduct {
            name: "Widget".to_string(),
            sku: format!("W-{}", uuid::Uuid::now_v7().simple()),
            stock,
            account_id: account.id_typed().to_string(),
        })
        .await
        .unwrap();
    (account, product)
}

fn purchase(account: &Account, product: &Product) -> Purchase {
    Purchase {
        account_id: account.id_typed().to_string(),
        product_id: product.id_typed().to_string(),
        quantity: 1,
    }
}

fn bench_single_purchase_latency(c: &mut Criterion) {
    let rt = runtime();
    let ledger = Ledger::new(Arc::new(InMemoryStore::new()), Locale::Es);
    let (account, product) = rt.block_on(seed(&ledger, i64::from(u32::MAX)));

    let mut group = c.benchmark_group("purchase_latency");
    group.throughput(Throughput::Elements(1));
    group.bench_function("uncontended", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(ledger.purchase(purchase(&account, &product)).await.unwrap())
        });
    });
    group.finish();
}

fn bench_contended_purchases(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("contended_purchases");
    group.sample_size(20);

    for tasks in [8usize, 64, 256].iter() {
        group.throughput(Throughput::Elements(*tasks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tasks), tasks, |b, &tasks| {
            b.to_async(&rt).iter(|| async move {
                let ledger = Arc::new(Ledger::new(Arc::new(InMemoryStore::new()), Locale::Es));
                // Half the tasks lose: stock covers only tasks / 2 units.
                let (account, product) = seed(&ledger, (tasks / 2) as i64).await;

                let handles: Vec<_> = (0..tasks)
                    .map(|_| {
                        let ledger = ledger.clone();
                        let req = purchase(&account, &product);
                        tokio::spawn(async move { ledger.purchase(req).await.unwrap().success })
                    })
                    .collect();

                let mut sold = 0usize;
                for h in handles {
                    if h.await.unwrap() {
                        sold += 1;
                    }
                }
                assert_eq!(sold, tasks / 2);
                black_box(sold)
            });
        });
    }
    group.finish();
}

fn bench_paginated_listing(c: &mut Criterion) {
    let rt = runtime();
    let ledger = Ledger::new(Arc::new(InMemoryStore::new()), Locale::Es);
    rt.block_on(async {
        for _ in 0..1_000 {
            seed(&ledger, 1).await;
        }
    });

    c.bench_function("list_accounts_page_of_100", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                ledger
                    .find_accounts(AccountsFilter {
                        name: Some("bench".to_string()),
                        page: Some(3),
                        limit: Some(100),
                    })
                    .await
                    .unwrap(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_single_purchase_latency,
    bench_contended_purchases,
    bench_paginated_listing
);
criterion_main!(benches);
