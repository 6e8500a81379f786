//! Repository contract tests against PostgreSQL
//!
//! Each test starts its own container, so they are ignored by default; run
//! them with `cargo test -p infra_db -- --ignored` on a host with Docker.

use catalog_core::{
    NewProduct, PageRequest, ProductField, ProductRepository, ProductRepositoryExt, Sort,
    StoreError,
};
use chrono::Duration;
use rust_decimal_macros::dec;
use test_utils::{
    assert_id_order, assert_names, assert_stored_as, assert_timestamps_ordered, db_test,
    ProductFixtures, TemporalFixtures, TestProductBuilder,
};

async fn seed(repo: &impl ProductRepository) {
    repo.insert_all(ProductFixtures::catalog())
        .await
        .expect("seed products");
}

db_test!(test_insert_assigns_sequence_ids_and_timestamps, |_db, repo| {
    let first = repo.insert(ProductFixtures::widget()).await.unwrap();
    let second = repo.insert(ProductFixtures::gear()).await.unwrap();

    assert_stored_as(&first, &ProductFixtures::widget());
    assert_eq!(first.date_created, first.last_updated);
    assert_eq!(second.id.value(), first.id.value() + 1);

    let found = repo.find_by_id(first.id).await.unwrap();
    assert_eq!(found, Some(first));
});

db_test!(test_duplicate_sku_is_rejected_with_constraint_name, |_db, repo| {
    repo.insert(ProductFixtures::widget()).await.unwrap();
    let error = repo
        .insert(NewProduct::new("SKU-WIDGET").with_name("Copy"))
        .await
        .unwrap_err();

    assert!(error.is_unique_violation());
    assert_eq!(error.constraint(), Some("sku_unique"));
    assert_eq!(repo.count().await.unwrap(), 1);
});

db_test!(test_insert_all_is_atomic, |_db, repo| {
    let batch = vec![
        TestProductBuilder::new().with_sku("SKU-A").build(),
        TestProductBuilder::new().with_sku("SKU-A").build(),
    ];
    assert!(repo.insert_all(batch).await.is_err());
    assert_eq!(repo.count().await.unwrap(), 0);
});

db_test!(test_update_keeps_creation_time, |_db, repo| {
    let stored = repo.insert(ProductFixtures::widget()).await.unwrap();

    let mut changed = stored.clone();
    changed.price = Some(dec!(17.25));
    changed.date_created = stored.date_created - Duration::days(30);
    let updated = repo.update(&changed).await.unwrap();

    assert_eq!(updated.price, Some(dec!(17.25)));
    assert_eq!(updated.date_created, stored.date_created);
    assert!(updated.last_updated >= stored.last_updated);
    assert_timestamps_ordered(&updated);
});

db_test!(test_update_of_missing_row_is_not_found, |_db, repo| {
    let stored = repo.insert(ProductFixtures::bolt()).await.unwrap();
    assert!(repo.delete(&stored).await.unwrap());

    let error = repo.update(&stored).await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound { .. }));
});

db_test!(test_update_of_deleted_row_reports_not_found_before_sku_clash, |_db, repo| {
    let first = repo.insert(NewProduct::new("SKU-A")).await.unwrap();
    repo.insert(NewProduct::new("SKU-B")).await.unwrap();
    assert!(repo.delete(&first).await.unwrap());

    let mut stale = first.clone();
    stale.sku = "SKU-B".to_string();
    let error = repo.update(&stale).await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound { .. }));
});

db_test!(test_column_limits, |_db, repo| {
    let stored = repo
        .insert(NewProduct::new("SKU-HALF").with_price(dec!(10.005)))
        .await
        .unwrap();
    assert_eq!(stored.price, Some(dec!(10.01)));
    assert_eq!(repo.find_by_price(dec!(10.01)).await.unwrap(), vec![stored]);

    let error = repo
        .insert(NewProduct::new("SKU-LONG").with_name("n".repeat(300)))
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::ValueTooLong(_)));
    assert_eq!(repo.count().await.unwrap(), 1);
});

db_test!(test_delete_and_exists, |_db, repo| {
    seed(&repo).await;
    let widget = repo.find_by_name("Widget").await.unwrap().unwrap();

    assert!(repo.exists_by_id(widget.id).await.unwrap());
    assert!(repo.delete_by_id(widget.id).await.unwrap());
    assert!(!repo.delete_by_id(widget.id).await.unwrap());
    assert!(!repo.exists_by_id(widget.id).await.unwrap());
    assert_eq!(repo.delete_all().await.unwrap(), 3);
});

db_test!(test_derived_lookups, |_db, repo| {
    seed(&repo).await;

    assert!(repo.find_by_name("Nothing").await.unwrap().is_none());
    assert_names(
        &repo
            .find_by_name_or_description("Bolt", "A small widget")
            .await
            .unwrap(),
        &["Gear", "Bolt"],
    );
    assert_names(
        &repo
            .find_by_name_and_description_and_price("Widget", "A standard widget", dec!(15))
            .await
            .unwrap(),
        &["Widget"],
    );
    assert_names(
        &repo.find_by_price_greater_than(dec!(15.00)).await.unwrap(),
        &["Sprocket", "Bolt"],
    );
    assert_names(
        &repo.find_by_price_between(dec!(10.00), dec!(20.00)).await.unwrap(),
        &["Widget", "Gear", "Sprocket"],
    );
    assert_names(
        &repo.find_by_name_containing("e").await.unwrap(),
        &["Widget", "Gear", "Sprocket"],
    );
    assert_names(&repo.find_by_name_like("_olt").await.unwrap(), &["Bolt"]);

    let all = repo
        .find_by_date_created_between(TemporalFixtures::long_ago(), TemporalFixtures::far_future())
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
    assert_id_order(&all);
});

db_test!(test_containing_treats_wildcards_literally, |_db, repo| {
    repo.insert(TestProductBuilder::new().with_name("100% Cotton").build())
        .await
        .unwrap();
    repo.insert(TestProductBuilder::new().with_name("1000 Cotton").build())
        .await
        .unwrap();

    assert_names(&repo.find_by_name_containing("0%").await.unwrap(), &["100% Cotton"]);
    assert_eq!(repo.find_by_name_like("100%").await.unwrap().len(), 2);
});

db_test!(test_malformed_like_pattern, |_db, repo| {
    seed(&repo).await;
    let error = repo.find_by_name_like("Bolt\\").await.unwrap_err();
    assert!(matches!(error, StoreError::MalformedQuery(_)));
});

db_test!(test_ordering_and_limits, |_db, repo| {
    seed(&repo).await;

    assert_names(
        &repo.find_first3_by_order_by_name_asc().await.unwrap(),
        &["Bolt", "Gear", "Sprocket"],
    );
    assert_names(
        &repo.find_all_order_by_name_desc().await.unwrap(),
        &["Widget", "Sprocket", "Gear", "Bolt"],
    );
    assert_names(
        &repo.find_all_order_by_name_asc().await.unwrap(),
        &["Bolt", "Gear", "Sprocket", "Widget"],
    );
    assert_names(
        &repo
            .find_all_sorted(Sort::desc(ProductField::Price))
            .await
            .unwrap(),
        &["Bolt", "Sprocket", "Widget", "Gear"],
    );
});

db_test!(test_structured_and_native_lookups_agree, |_db, repo| {
    seed(&repo).await;

    let structured = repo
        .find_by_name_or_description_jpql_named_param("Bolt", "A small widget")
        .await
        .unwrap();
    let native = repo
        .find_by_name_or_description_sql_named_param("Bolt", "A small widget")
        .await
        .unwrap();
    assert_eq!(structured, native);

    let search = repo.search_products("WIDGET").await.unwrap();
    let search_sql = repo.search_products_sql("WIDGET").await.unwrap();
    assert_names(&search, &["Widget", "Gear"]);
    assert_eq!(search, search_sql);

    assert_names(&repo.find_by_price(dec!(20.00)).await.unwrap(), &["Sprocket"]);
    let hex = repo.find_by_description("Hex bolt").await.unwrap().unwrap();
    assert_eq!(hex.name.as_deref(), Some("Bolt"));
});

db_test!(test_single_result_lookup_rejects_duplicates, |_db, repo| {
    repo.insert(TestProductBuilder::new().with_description("Same").build())
        .await
        .unwrap();
    repo.insert(TestProductBuilder::new().with_description("Same").build())
        .await
        .unwrap();

    let error = repo.find_by_description("Same").await.unwrap_err();
    assert!(matches!(error, StoreError::NonUniqueResult { found: 2 }));
});

db_test!(test_paging, |db, repo| {
    seed(&repo).await;

    let request = PageRequest::of(1, 3).with_sort(Sort::asc(ProductField::Name));
    let page = repo.find_page(request).await.unwrap();

    assert_names(&page.content, &["Widget"]);
    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages, 2);
    assert!(page.is_last());

    db.clear_data().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 0);
});
