//! Service-level tests against an embedded database
//!
//! Each test opens a fresh SurrealDB in a temp dir and drives the services
//! with explicit `now` values so discount/sale windows are deterministic.

use surrealdb::RecordId;

use crate::auth::{CurrentUser, Role};
use crate::core::{Config, ServerState};
use crate::db::models::{
    BundleCreate, BundleLineInput, BundleUpdate, Category, DiscountCreate, DiscountKind,
    ProductCreate, SaleAddProducts, SaleCategoryInput, SaleCreate, SaleProductInput,
    SaleRemoveProducts,
};
use crate::db::repository::{
    BundleRepository, CategoryRepository, DiscountRepository, ProductRepository, SaleRepository,
};
use crate::services::{BundleService, DiscountService, ProductService, SaleService};
use crate::utils::time::millis_to_rfc3339;
use shared::ErrorCode;

const HOUR: i64 = 3_600_000;
const NOW: i64 = 1_700_000_000_000;

async fn test_state() -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await.expect("state");
    (state, dir)
}

fn seller(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        role: Role::Seller,
    }
}

fn admin(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        role: Role::Admin,
    }
}

async fn seed_category(state: &ServerState, name: &str) -> RecordId {
    let repo = CategoryRepository::new(state.get_db());
    let category = repo
        .create(Category {
            id: None,
            name: name.to_string(),
            description: format!("{name} products"),
            is_active: true,
            product_ids: Vec::new(),
            created_at: NOW,
        })
        .await
        .expect("category");
    category.id.expect("category id")
}

fn product_payload(name: &str, mrp: f64, discount: f64) -> ProductCreate {
    ProductCreate {
        name: Some(name.to_string()),
        description: Some(format!("{name} description")),
        mrp: Some(mrp),
        discount: Some(discount),
        quantity: Some(5),
        category_id: None,
    }
}

fn bundle_line(product_id: &RecordId, quantity: i64) -> BundleLineInput {
    BundleLineInput {
        product_id: Some(product_id.to_string()),
        quantity: Some(quantity),
    }
}

// ========== Product pricing invariant ==========

#[tokio::test]
async fn product_create_derives_selling_price() {
    let (state, _dir) = test_state().await;
    let service = ProductService::new(&state);
    let user = seller("s1");

    let product = service
        .create(&user, product_payload("Keyboard", 200.0, 25.0), NOW)
        .await
        .expect("create");

    assert!((product.selling_price - 150.0).abs() < 1e-6);
    assert!((product.final_price - 150.0).abs() < 1e-6);
}

#[tokio::test]
async fn product_update_recomputes_from_resulting_values() {
    let (state, _dir) = test_state().await;
    let service = ProductService::new(&state);
    let user = seller("s1");

    let product = service
        .create(&user, product_payload("Keyboard", 200.0, 25.0), NOW)
        .await
        .expect("create");
    let id = product.id.expect("id").to_string();

    // Change only the discount: selling price uses new discount + stored MRP
    let updated = service
        .update(
            &user,
            &id,
            crate::db::models::ProductUpdate {
                discount: Some(10.0),
                ..Default::default()
            },
            NOW + HOUR,
        )
        .await
        .expect("update");
    assert!((updated.selling_price - 180.0).abs() < 1e-6);

    // Change only the MRP: selling price uses stored discount
    let updated = service
        .update(
            &user,
            &id,
            crate::db::models::ProductUpdate {
                mrp: Some(300.0),
                ..Default::default()
            },
            NOW + 2 * HOUR,
        )
        .await
        .expect("update");
    assert!((updated.selling_price - 270.0).abs() < 1e-6);
}

#[tokio::test]
async fn product_create_rejects_first_invalid_field() {
    let (state, _dir) = test_state().await;
    let service = ProductService::new(&state);
    let user = seller("s1");

    // Missing MRP fails before the (also invalid) discount is looked at
    let err = service
        .create(
            &user,
            ProductCreate {
                name: Some("Widget".into()),
                mrp: None,
                discount: Some(250.0),
                quantity: Some(1),
                ..Default::default()
            },
            NOW,
        )
        .await
        .expect_err("must fail");
    assert_eq!(err.code, ErrorCode::ValidationFailed);
    assert!(err.message.contains("MRP"));
}

#[tokio::test]
async fn product_duplicate_name_conflicts() {
    let (state, _dir) = test_state().await;
    let service = ProductService::new(&state);
    let user = seller("s1");

    service
        .create(&user, product_payload("Keyboard", 100.0, 0.0), NOW)
        .await
        .expect("create");
    let err = service
        .create(&user, product_payload("Keyboard", 120.0, 0.0), NOW)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code, ErrorCode::ProductNameExists);

    // A different seller may reuse the name
    service
        .create(&seller("s2"), product_payload("Keyboard", 120.0, 0.0), NOW)
        .await
        .expect("other seller");
}

// ========== Ownership enforcement ==========

#[tokio::test]
async fn mutations_require_ownership() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let owner = seller("s1");
    let intruder = seller("s2");

    let product = products
        .create(&owner, product_payload("Keyboard", 100.0, 0.0), NOW)
        .await
        .expect("create");
    let id = product.id.clone().expect("id").to_string();

    let err = products
        .update(
            &intruder,
            &id,
            crate::db::models::ProductUpdate {
                mrp: Some(1.0),
                ..Default::default()
            },
            NOW,
        )
        .await
        .expect_err("foreign update");
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = products
        .delete(&intruder, &id, NOW)
        .await
        .expect_err("foreign delete");
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    // No state mutation happened
    let repo = ProductRepository::new(state.get_db());
    let stored = repo
        .find_by_id(product.id.as_ref().expect("id"))
        .await
        .expect("query")
        .expect("still there");
    assert!((stored.mrp - 100.0).abs() < 1e-6);
    assert!(!stored.is_deleted);
}

// ========== Bundle aggregate invariant ==========

#[tokio::test]
async fn bundle_create_aggregates_member_prices() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);
    let user = seller("s1");

    let p1 = products
        .create(&user, product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("p1");
    let p2 = products
        .create(&user, product_payload("Pad", 50.0, 0.0), NOW)
        .await
        .expect("p2");
    let p1_id = p1.id.expect("id");
    let p2_id = p2.id.expect("id");

    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Desk Set".into()),
                description: Some("Mouse and pad".into()),
                discount: Some(10.0),
                products: Some(vec![bundle_line(&p1_id, 2), bundle_line(&p2_id, 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");

    // MRP = 100*2 + 50*1 = 250; selling = 250 * 0.9 = 225
    assert!((bundle.mrp - 250.0).abs() < 1e-6);
    assert!((bundle.selling_price - 225.0).abs() < 1e-6);

    // Back-references were written after the bundle id existed
    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&p1_id).await.expect("q").expect("p1");
    assert_eq!(stored.bundle_ids, vec![bundle.id.expect("bundle id")]);
}

#[tokio::test]
async fn bundle_create_rejects_foreign_member() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);

    let mine = products
        .create(&seller("s1"), product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("mine");
    let theirs = products
        .create(&seller("s2"), product_payload("Pad", 50.0, 0.0), NOW)
        .await
        .expect("theirs");

    let err = bundles
        .create(
            &seller("s1"),
            BundleCreate {
                name: Some("Desk Set".into()),
                description: Some("Mixed ownership".into()),
                discount: Some(0.0),
                products: Some(vec![
                    bundle_line(&mine.id.expect("id"), 1),
                    bundle_line(&theirs.id.expect("id"), 1),
                ]),
            },
            NOW,
        )
        .await
        .expect_err("foreign member");
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn bundle_update_rejects_duplicate_member_and_keeps_state() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);
    let user = seller("s1");

    let p1 = products
        .create(&user, product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("p1");
    let p1_id = p1.id.expect("id");

    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Solo".into()),
                description: Some("One product".into()),
                discount: Some(0.0),
                products: Some(vec![bundle_line(&p1_id, 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");
    let bundle_id = bundle.id.expect("id");

    let err = bundles
        .update(
            &user,
            &bundle_id.to_string(),
            BundleUpdate {
                products: Some(vec![bundle_line(&p1_id, 1)]),
                ..Default::default()
            },
            NOW + HOUR,
        )
        .await
        .expect_err("duplicate member");
    assert_eq!(err.code, ErrorCode::BundleDuplicateProduct);

    // Bundle unchanged
    let repo = BundleRepository::new(state.get_db());
    let stored = repo.find_by_id(&bundle_id).await.expect("q").expect("b");
    assert_eq!(stored.products.len(), 1);
    assert!((stored.mrp - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn bundle_update_merges_membership_and_reprices() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);
    let user = seller("s1");

    let p1 = products
        .create(&user, product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("p1");
    let p2 = products
        .create(&user, product_payload("Pad", 50.0, 0.0), NOW)
        .await
        .expect("p2");

    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Desk Set".into()),
                description: Some("Starts with the mouse".into()),
                discount: Some(0.0),
                products: Some(vec![bundle_line(&p1.id.expect("id"), 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");

    let updated = bundles
        .update(
            &user,
            &bundle.id.expect("id").to_string(),
            BundleUpdate {
                discount: Some(20.0),
                products: Some(vec![bundle_line(&p2.id.expect("id"), 2)]),
                ..Default::default()
            },
            NOW + HOUR,
        )
        .await
        .expect("update");

    // Merged membership: 100*1 + 50*2 = 200; selling = 200 * 0.8 = 160
    assert_eq!(updated.products.len(), 2);
    assert!((updated.mrp - 200.0).abs() < 1e-6);
    assert!((updated.selling_price - 160.0).abs() < 1e-6);
}

#[tokio::test]
async fn bundle_remove_product_reprices_remaining() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);
    let user = seller("s1");

    let p1 = products
        .create(&user, product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("p1");
    let p2 = products
        .create(&user, product_payload("Pad", 50.0, 0.0), NOW)
        .await
        .expect("p2");
    let p1_id = p1.id.expect("id");

    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Desk Set".into()),
                description: Some("Both".into()),
                discount: Some(0.0),
                products: Some(vec![bundle_line(&p1_id, 1), bundle_line(&p2.id.expect("id"), 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");
    let bundle_id = bundle.id.expect("id");

    let updated = bundles
        .remove_product(&user, &bundle_id.to_string(), &p1_id.to_string(), NOW + HOUR)
        .await
        .expect("remove");

    assert_eq!(updated.products.len(), 1);
    assert!((updated.mrp - 50.0).abs() < 1e-6);

    // Back-reference cleared on the removed product
    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&p1_id).await.expect("q").expect("p1");
    assert!(stored.bundle_ids.is_empty());

    // Removing a non-member is NotFound
    let err = bundles
        .remove_product(&user, &bundle_id.to_string(), &p1_id.to_string(), NOW + HOUR)
        .await
        .expect_err("not a member");
    assert_eq!(err.code, ErrorCode::BundleProductMissing);
}

// ========== Cascade on product delete ==========

#[tokio::test]
async fn product_delete_cascades_into_bundles() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);
    let user = seller("s1");

    let p1 = products
        .create(&user, product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("p1");
    let p2 = products
        .create(&user, product_payload("Pad", 200.0, 0.0), NOW)
        .await
        .expect("p2");
    let p1_id = p1.id.expect("id");

    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Desk Set".into()),
                description: Some("Both".into()),
                discount: Some(0.0),
                products: Some(vec![bundle_line(&p1_id, 1), bundle_line(&p2.id.expect("id"), 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");
    let bundle_id = bundle.id.expect("id");

    products
        .delete(&user, &p1_id.to_string(), NOW + HOUR)
        .await
        .expect("delete");

    // Product soft-deleted, not removed
    let product_repo = ProductRepository::new(state.get_db());
    let stored = product_repo.find_by_id(&p1_id).await.expect("q").expect("p1");
    assert!(stored.is_deleted);

    // Bundle still exists, repriced from the remaining member
    let bundle_repo = BundleRepository::new(state.get_db());
    let stored = bundle_repo.find_by_id(&bundle_id).await.expect("q").expect("b");
    assert!(!stored.is_deleted);
    assert_eq!(stored.products.len(), 1);
    assert!((stored.mrp - 200.0).abs() < 1e-6);
    assert!((stored.selling_price - 200.0).abs() < 1e-6);
}

#[tokio::test]
async fn product_delete_empties_bundle_to_zero() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let bundles = BundleService::new(&state);
    let user = seller("s1");

    let p1 = products
        .create(&user, product_payload("Mouse", 100.0, 0.0), NOW)
        .await
        .expect("p1");
    let p1_id = p1.id.expect("id");

    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Solo".into()),
                description: Some("Single member".into()),
                discount: Some(0.0),
                products: Some(vec![bundle_line(&p1_id, 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");

    products
        .delete(&user, &p1_id.to_string(), NOW + HOUR)
        .await
        .expect("delete");

    let repo = BundleRepository::new(state.get_db());
    let stored = repo
        .find_by_id(&bundle.id.expect("id"))
        .await
        .expect("q")
        .expect("b");
    assert!(stored.products.is_empty());
    assert!((stored.mrp - 0.0).abs() < 1e-6);
}

// ========== Discount lifecycle ==========

fn discount_payload(
    product_id: &RecordId,
    kind: DiscountKind,
    value: f64,
    start_at: i64,
    end_at: i64,
) -> DiscountCreate {
    DiscountCreate {
        product_id: Some(product_id.to_string()),
        bundle_id: None,
        discount_type: Some(kind),
        discount_value: Some(value),
        start_date: Some(millis_to_rfc3339(start_at)),
        end_date: Some(millis_to_rfc3339(end_at)),
    }
}

#[tokio::test]
async fn discount_requires_exactly_one_target() {
    let (state, _dir) = test_state().await;
    let discounts = DiscountService::new(&state);
    let user = seller("s1");

    let err = discounts
        .add(
            &user,
            DiscountCreate {
                product_id: None,
                bundle_id: None,
                discount_type: Some(DiscountKind::Percentage),
                discount_value: Some(10.0),
                start_date: Some(millis_to_rfc3339(NOW)),
                end_date: Some(millis_to_rfc3339(NOW + HOUR)),
            },
            NOW,
        )
        .await
        .expect_err("no target");
    assert_eq!(err.code, ErrorCode::DiscountTargetAmbiguous);
}

#[tokio::test]
async fn pending_discount_is_stored_but_not_applied() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let discounts = DiscountService::new(&state);
    let user = seller("s1");

    let product = products
        .create(&user, product_payload("Keyboard", 100.0, 0.0), NOW)
        .await
        .expect("product");
    let product_id = product.id.expect("id");

    // Window entirely in the future
    discounts
        .add(
            &user,
            discount_payload(
                &product_id,
                DiscountKind::Percentage,
                50.0,
                NOW + HOUR,
                NOW + 2 * HOUR,
            ),
            NOW,
        )
        .await
        .expect("add");

    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert!(stored.discounts.is_empty());
    assert!((stored.final_price - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn active_discounts_fold_in_order() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let discounts = DiscountService::new(&state);
    let user = seller("s1");

    let product = products
        .create(&user, product_payload("Keyboard", 100.0, 0.0), NOW)
        .await
        .expect("product");
    let product_id = product.id.expect("id");

    discounts
        .add(
            &user,
            discount_payload(&product_id, DiscountKind::Percentage, 10.0, NOW - HOUR, NOW + HOUR),
            NOW,
        )
        .await
        .expect("pct");
    discounts
        .add(
            &user,
            discount_payload(&product_id, DiscountKind::Fixed, 5.0, NOW - HOUR, NOW + HOUR),
            NOW,
        )
        .await
        .expect("fixed");

    // (100 * 0.9) - 5 = 85
    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert_eq!(stored.discounts.len(), 2);
    assert!((stored.final_price - 85.0).abs() < 1e-6);
}

#[tokio::test]
async fn discount_update_can_attach_and_detach() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let discounts = DiscountService::new(&state);
    let user = seller("s1");

    let product = products
        .create(&user, product_payload("Keyboard", 100.0, 0.0), NOW)
        .await
        .expect("product");
    let product_id = product.id.expect("id");

    // Starts pending
    let discount = discounts
        .add(
            &user,
            discount_payload(
                &product_id,
                DiscountKind::Percentage,
                20.0,
                NOW + HOUR,
                NOW + 2 * HOUR,
            ),
            NOW,
        )
        .await
        .expect("add");
    let discount_id = discount.id.expect("id").to_string();

    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert!(stored.discounts.is_empty());

    // Move the window over "now" — attaches and reprices
    discounts
        .update(
            &user,
            &discount_id,
            crate::db::models::DiscountUpdate {
                discount_type: Some(DiscountKind::Percentage),
                discount_value: Some(20.0),
                start_date: Some(millis_to_rfc3339(NOW - HOUR)),
                end_date: Some(millis_to_rfc3339(NOW + HOUR)),
            },
            NOW,
        )
        .await
        .expect("activate");
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert_eq!(stored.discounts.len(), 1);
    assert!((stored.final_price - 80.0).abs() < 1e-6);

    // Move the window into the past — detaches and restores the price
    discounts
        .update(
            &user,
            &discount_id,
            crate::db::models::DiscountUpdate {
                discount_type: Some(DiscountKind::Percentage),
                discount_value: Some(20.0),
                start_date: Some(millis_to_rfc3339(NOW - 3 * HOUR)),
                end_date: Some(millis_to_rfc3339(NOW - 2 * HOUR)),
            },
            NOW,
        )
        .await
        .expect("expire");
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert!(stored.discounts.is_empty());
    assert!((stored.final_price - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn discount_remove_strips_reference_and_reprices() {
    let (state, _dir) = test_state().await;
    let products = ProductService::new(&state);
    let discounts = DiscountService::new(&state);
    let user = seller("s1");

    let product = products
        .create(&user, product_payload("Keyboard", 100.0, 0.0), NOW)
        .await
        .expect("product");
    let product_id = product.id.expect("id");

    let discount = discounts
        .add(
            &user,
            discount_payload(&product_id, DiscountKind::Percentage, 10.0, NOW - HOUR, NOW + HOUR),
            NOW,
        )
        .await
        .expect("add");

    discounts
        .remove(&user, &discount.id.expect("id").to_string(), NOW)
        .await
        .expect("remove");

    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert!(stored.discounts.is_empty());
    assert!((stored.final_price - 100.0).abs() < 1e-6);

    let discount_repo = DiscountRepository::new(state.get_db());
    let all = discount_repo.find_for_target(&product_id).await.expect("q");
    assert!(all.is_empty());
}

// ========== Sale participation ==========

struct SaleFixture {
    sale_id: RecordId,
    category_id: RecordId,
}

/// Schedule a sale covering one category at the given discount.
/// The sale runs from NOW-HOUR to NOW+10*HOUR (already started).
async fn seed_running_sale(state: &ServerState, discount: f64) -> SaleFixture {
    let category_id = seed_category(state, "Electronics").await;
    let sales = SaleService::new(state);
    let sale = sales
        .create(
            &admin("a1"),
            SaleCreate {
                name: Some("Mega Sale".into()),
                description: Some("Category-wide discounts".into()),
                start_date: Some(millis_to_rfc3339(NOW - HOUR)),
                end_date: Some(millis_to_rfc3339(NOW + 10 * HOUR)),
                categories: Some(vec![SaleCategoryInput {
                    category_id: Some(category_id.to_string()),
                    discount: Some(discount),
                }]),
            },
            NOW,
        )
        .await
        .expect("sale");
    SaleFixture {
        sale_id: sale.id.expect("sale id"),
        category_id,
    }
}

async fn seed_categorized_product(
    state: &ServerState,
    user: &CurrentUser,
    name: &str,
    mrp: f64,
    discount: f64,
    category_id: &RecordId,
) -> RecordId {
    let products = ProductService::new(state);
    let product = products
        .create(
            user,
            ProductCreate {
                name: Some(name.to_string()),
                description: Some(format!("{name} description")),
                mrp: Some(mrp),
                discount: Some(discount),
                quantity: Some(5),
                category_id: Some(category_id.to_string()),
            },
            NOW,
        )
        .await
        .expect("product");
    product.id.expect("id")
}

#[tokio::test]
async fn sale_add_applies_rounded_discount_and_remove_reverses() {
    let (state, _dir) = test_state().await;
    let user = seller("s1");
    let fixture = seed_running_sale(&state, 10.0).await;

    // selling price 90 (MRP 100, 10% seller discount)
    let product_id =
        seed_categorized_product(&state, &user, "Headset", 100.0, 10.0, &fixture.category_id)
            .await;

    let sales = SaleService::new(&state);
    sales
        .add_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleAddProducts {
                products: Some(vec![SaleProductInput {
                    product_id: Some(product_id.to_string()),
                }]),
            },
            NOW,
        )
        .await
        .expect("add");

    let repo = ProductRepository::new(state.get_db());
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    // round(90 * 0.9) = 81
    assert!((stored.selling_price - 81.0).abs() < 1e-6);
    assert_eq!(stored.admin_discount, Some(10.0));

    let report = sales
        .remove_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleRemoveProducts {
                product_ids: Some(vec![product_id.to_string()]),
            },
            NOW,
        )
        .await
        .expect("remove");
    assert_eq!(report.removed_products.len(), 1);
    assert!(report.not_found_products.is_empty());

    // Reversal recovers the pre-discount price up to the forward rounding
    // step (±1 is inherent, not a bug)
    let stored = repo.find_by_id(&product_id).await.expect("q").expect("p");
    assert!(
        (stored.selling_price - 90.0).abs() <= 1.0,
        "reversed to {}",
        stored.selling_price
    );
    assert_eq!(stored.admin_discount, None);

    let sale_repo = SaleRepository::new(state.get_db());
    let sale = sale_repo
        .find_by_id(&fixture.sale_id)
        .await
        .expect("q")
        .expect("sale");
    assert!(sale.products.is_empty());
}

#[tokio::test]
async fn sale_rejects_product_outside_configured_categories() {
    let (state, _dir) = test_state().await;
    let user = seller("s1");
    let fixture = seed_running_sale(&state, 10.0).await;

    let other_category = seed_category(&state, "Furniture").await;
    let product_id =
        seed_categorized_product(&state, &user, "Chair", 100.0, 0.0, &other_category).await;

    let sales = SaleService::new(&state);
    let err = sales
        .add_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleAddProducts {
                products: Some(vec![SaleProductInput {
                    product_id: Some(product_id.to_string()),
                }]),
            },
            NOW,
        )
        .await
        .expect_err("category mismatch");
    assert_eq!(err.code, ErrorCode::SaleCategoryMismatch);

    // No partial mutation of the sale
    let sale_repo = SaleRepository::new(state.get_db());
    let sale = sale_repo
        .find_by_id(&fixture.sale_id)
        .await
        .expect("q")
        .expect("sale");
    assert!(sale.products.is_empty());
    assert!(sale.bundles.is_empty());
}

#[tokio::test]
async fn sale_rejects_duplicate_membership() {
    let (state, _dir) = test_state().await;
    let user = seller("s1");
    let fixture = seed_running_sale(&state, 10.0).await;
    let product_id =
        seed_categorized_product(&state, &user, "Headset", 100.0, 0.0, &fixture.category_id)
            .await;

    let sales = SaleService::new(&state);
    let payload = || SaleAddProducts {
        products: Some(vec![SaleProductInput {
            product_id: Some(product_id.to_string()),
        }]),
    };

    sales
        .add_products(&user, &fixture.sale_id.to_string(), payload(), NOW)
        .await
        .expect("first add");
    let err = sales
        .add_products(&user, &fixture.sale_id.to_string(), payload(), NOW)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code, ErrorCode::SaleDuplicateProduct);
}

#[tokio::test]
async fn sale_rejects_mutations_after_end() {
    let (state, _dir) = test_state().await;
    let user = seller("s1");
    let fixture = seed_running_sale(&state, 10.0).await;
    let product_id =
        seed_categorized_product(&state, &user, "Headset", 100.0, 0.0, &fixture.category_id)
            .await;

    let sales = SaleService::new(&state);
    let err = sales
        .add_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleAddProducts {
                products: Some(vec![SaleProductInput {
                    product_id: Some(product_id.to_string()),
                }]),
            },
            NOW + 20 * HOUR,
        )
        .await
        .expect_err("ended");
    assert_eq!(err.code, ErrorCode::SaleEnded);
}

#[tokio::test]
async fn sale_remove_reports_partial_success() {
    let (state, _dir) = test_state().await;
    let user = seller("s1");
    let fixture = seed_running_sale(&state, 10.0).await;
    let member =
        seed_categorized_product(&state, &user, "Headset", 100.0, 0.0, &fixture.category_id)
            .await;
    let outsider =
        seed_categorized_product(&state, &user, "Webcam", 80.0, 0.0, &fixture.category_id).await;

    let sales = SaleService::new(&state);
    sales
        .add_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleAddProducts {
                products: Some(vec![SaleProductInput {
                    product_id: Some(member.to_string()),
                }]),
            },
            NOW,
        )
        .await
        .expect("add");

    let report = sales
        .remove_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleRemoveProducts {
                product_ids: Some(vec![member.to_string(), outsider.to_string()]),
            },
            NOW,
        )
        .await
        .expect("remove");

    assert_eq!(report.removed_products, vec![member.to_string()]);
    assert_eq!(report.not_found_products, vec![outsider.to_string()]);
}

#[tokio::test]
async fn sale_add_pulls_in_containing_bundle_with_max_discount() {
    let (state, _dir) = test_state().await;
    let user = seller("s1");
    let fixture = seed_running_sale(&state, 20.0).await;

    let p1 =
        seed_categorized_product(&state, &user, "Headset", 100.0, 0.0, &fixture.category_id)
            .await;
    let p2 =
        seed_categorized_product(&state, &user, "Webcam", 50.0, 0.0, &fixture.category_id).await;

    let bundles = BundleService::new(&state);
    let bundle = bundles
        .create(
            &user,
            BundleCreate {
                name: Some("Streaming Kit".into()),
                description: Some("Headset and webcam".into()),
                discount: Some(0.0),
                products: Some(vec![bundle_line(&p1, 1), bundle_line(&p2, 1)]),
            },
            NOW,
        )
        .await
        .expect("bundle");
    let bundle_id = bundle.id.expect("id");

    let sales = SaleService::new(&state);
    sales
        .add_products(
            &user,
            &fixture.sale_id.to_string(),
            SaleAddProducts {
                products: Some(vec![SaleProductInput {
                    product_id: Some(p1.to_string()),
                }]),
            },
            NOW,
        )
        .await
        .expect("add");

    let sale_repo = SaleRepository::new(state.get_db());
    let sale = sale_repo
        .find_by_id(&fixture.sale_id)
        .await
        .expect("q")
        .expect("sale");
    assert!(sale.contains_bundle(&bundle_id));

    // Bundle repriced: p1 was discounted to round(100*0.8)=80 first, then
    // the bundle total (80 + 50) took the max category discount 20%:
    // round(130 * 0.8) = 104
    let bundle_repo = BundleRepository::new(state.get_db());
    let stored = bundle_repo.find_by_id(&bundle_id).await.expect("q").expect("b");
    assert!((stored.selling_price - 104.0).abs() < 1e-6);
    assert_eq!(stored.admin_discount, Some(20.0));
}
