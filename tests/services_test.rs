mod common;

use uuid::Uuid;

use store_unit_of_work::entities::{NewAddress, NewClient, NewImage, NewProduct, NewSupplier};
use store_unit_of_work::services::{ClientService, ImageService, ProductService, SupplierService};
use store_unit_of_work::{DeleteOutcome, StoreError};

use common::{
    address_count, cleanup_database, client_count, image_count, new_store, product_count,
    setup_database, supplier_count,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_two_suppliers_at_one_address_share_one_row() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());

    let first = suppliers
        .create(
            NewSupplier::new("Bosch Supply", "+49 30 1234"),
            NewAddress::new("Germany", "Berlin", "Alexanderplatz 1"),
        )
        .await
        .expect("Failed to create first supplier");
    let second = suppliers
        .create(
            NewSupplier::new("Siemens Parts", "+49 30 5678"),
            NewAddress::new("Germany", "Berlin", "Alexanderplatz 1"),
        )
        .await
        .expect("Failed to create second supplier");

    assert_eq!(first.address_id, second.address_id);
    assert_eq!(address_count(&uow).await, 1);
    assert_eq!(supplier_count(&uow).await, 2);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_address_swap_collects_the_orphaned_row() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());

    let supplier = suppliers
        .create(
            NewSupplier::new("Bosch Supply", "+49 30 1234"),
            NewAddress::new("Germany", "Berlin", "Alexanderplatz 1"),
        )
        .await
        .expect("Failed to create supplier");
    let old_address_id = supplier.address_id;

    let updated = suppliers
        .update_address(supplier.id, NewAddress::new("Germany", "Munich", "Marienplatz 8"))
        .await
        .expect("Failed to update address");

    assert_ne!(updated.address_id, old_address_id);
    // The old row had no other referent, so exactly the new row remains.
    assert_eq!(address_count(&uow).await, 1);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_address_swap_keeps_a_row_still_referenced_elsewhere() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());

    let shared = NewAddress::new("Germany", "Berlin", "Alexanderplatz 1");
    let moving = suppliers
        .create(NewSupplier::new("Bosch Supply", "+49 30 1234"), shared.clone())
        .await
        .expect("Failed to create first supplier");
    let staying = suppliers
        .create(NewSupplier::new("Siemens Parts", "+49 30 5678"), shared)
        .await
        .expect("Failed to create second supplier");

    let updated = suppliers
        .update_address(moving.id, NewAddress::new("Germany", "Munich", "Marienplatz 8"))
        .await
        .expect("Failed to update address");

    // Old and new rows both exist; the staying supplier is untouched.
    assert_eq!(address_count(&uow).await, 2);
    let staying_now = suppliers
        .get(staying.id)
        .await
        .expect("Failed to re-read staying supplier");
    assert_eq!(staying_now.address_id, moving.address_id);
    assert_ne!(updated.address_id, staying_now.address_id);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_address_swap_to_the_same_address_is_a_no_op() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());

    let address = NewAddress::new("Germany", "Berlin", "Alexanderplatz 1");
    let supplier = suppliers
        .create(NewSupplier::new("Bosch Supply", "+49 30 1234"), address.clone())
        .await
        .expect("Failed to create supplier");

    let updated = suppliers
        .update_address(supplier.id, address)
        .await
        .expect("Updating to the same address should succeed");

    assert_eq!(updated.address_id, supplier.address_id);
    assert_eq!(address_count(&uow).await, 1);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_address_swap_for_unknown_supplier_changes_nothing() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());

    let err = suppliers
        .update_address(
            Uuid::new_v4(),
            NewAddress::new("Germany", "Hamburg", "Reeperbahn 1"),
        )
        .await
        .expect_err("Unknown supplier should fail");
    assert!(matches!(err, StoreError::NotFound { entity: "supplier", .. }));

    // The address inserted in step one of the swap was rolled back.
    assert_eq!(address_count(&uow).await, 0);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_clients_share_and_release_addresses() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let clients = ClientService::new(uow.clone());

    let shared = NewAddress::new("Austria", "Vienna", "Ringstrasse 4");
    let first = clients
        .create(NewClient::new("Anna", "Gruber", "anna@example.com"), shared.clone())
        .await
        .expect("Failed to create first client");
    let second = clients
        .create(NewClient::new("Max", "Huber", "max@example.com"), shared)
        .await
        .expect("Failed to create second client");

    assert_eq!(first.address_id, second.address_id);
    assert_eq!(address_count(&uow).await, 1);

    // Deleting one client keeps the shared row; deleting the last one
    // collects it.
    clients.delete(first.id).await.expect("Failed to delete first client");
    assert_eq!(address_count(&uow).await, 1);
    clients.delete(second.id).await.expect("Failed to delete second client");
    assert_eq!(address_count(&uow).await, 0);
    assert_eq!(client_count(&uow).await, 0);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_product_creation_requires_an_existing_supplier() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let products = ProductService::new(uow.clone());

    let err = products
        .create(NewProduct::new("Toaster TX-1", "kitchen", 4999, Uuid::new_v4()))
        .await
        .expect_err("Missing supplier should fail");
    assert!(matches!(err, StoreError::NotFound { entity: "supplier", .. }));
    assert_eq!(product_count(&uow).await, 0);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_setting_a_new_image_collects_the_replaced_one() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());
    let products = ProductService::new(uow.clone());

    let supplier = suppliers
        .create(
            NewSupplier::new("Bosch Supply", "+49 30 1234"),
            NewAddress::new("Germany", "Berlin", "Alexanderplatz 1"),
        )
        .await
        .expect("Failed to create supplier");
    let product = products
        .create(NewProduct::new("Fridge F-200", "cooling", 79900, supplier.id))
        .await
        .expect("Failed to create product");
    assert_eq!(product.image_id, None);

    let with_first = products
        .set_image(product.id, NewImage::new("front", "https://img.example.com/f200-a.jpg"))
        .await
        .expect("Failed to set first image");
    let first_image_id = with_first.image_id.expect("Product should carry an image");
    assert_eq!(image_count(&uow).await, 1);

    let with_second = products
        .set_image(product.id, NewImage::new("side", "https://img.example.com/f200-b.jpg"))
        .await
        .expect("Failed to set second image");
    let second_image_id = with_second.image_id.expect("Product should carry an image");

    assert_ne!(first_image_id, second_image_id);
    // The replaced image had no other referent and was collected.
    assert_eq!(image_count(&uow).await, 1);

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_image_delete_is_skipped_while_a_product_references_it() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let suppliers = SupplierService::new(uow.clone());
    let products = ProductService::new(uow.clone());
    let images = ImageService::new(uow.clone());

    let supplier = suppliers
        .create(
            NewSupplier::new("Bosch Supply", "+49 30 1234"),
            NewAddress::new("Germany", "Berlin", "Alexanderplatz 1"),
        )
        .await
        .expect("Failed to create supplier");
    let product = products
        .create(NewProduct::new("Oven O-90", "kitchen", 54900, supplier.id))
        .await
        .expect("Failed to create product");
    let product = products
        .set_image(product.id, NewImage::new("front", "https://img.example.com/o90.jpg"))
        .await
        .expect("Failed to set image");
    let image_id = product.image_id.expect("Product should carry an image");

    let outcome = images
        .delete(image_id)
        .await
        .expect("Safe delete should not error");
    assert_eq!(outcome, DeleteOutcome::SkippedStillReferenced);
    assert_eq!(image_count(&uow).await, 1);

    // Dropping the product collects the image, after which a delete goes
    // through as NotFound on re-attempt.
    products.delete(product.id).await.expect("Failed to delete product");
    assert_eq!(image_count(&uow).await, 0);
    let err = images
        .delete(image_id)
        .await
        .expect_err("Image is gone after product deletion");
    assert!(matches!(err, StoreError::NotFound { entity: "image", .. }));

    cleanup_database(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
async fn test_client_and_supplier_can_share_one_address() {
    let pool = setup_database().await;
    let uow = new_store(&pool);
    let clients = ClientService::new(uow.clone());
    let suppliers = SupplierService::new(uow.clone());

    let shared = NewAddress::new("Germany", "Berlin", "Alexanderplatz 1");
    let supplier = suppliers
        .create(NewSupplier::new("Bosch Supply", "+49 30 1234"), shared.clone())
        .await
        .expect("Failed to create supplier");
    let client = clients
        .create(NewClient::new("Jana", "Schmidt", "jana@example.com"), shared)
        .await
        .expect("Failed to create client");
    assert_eq!(supplier.address_id, client.address_id);
    assert_eq!(address_count(&uow).await, 1);

    // The client leaving does not pull the address from under the supplier.
    clients.delete(client.id).await.expect("Failed to delete client");
    assert_eq!(address_count(&uow).await, 1);
    let supplier_now = suppliers
        .get(supplier.id)
        .await
        .expect("Supplier should still resolve");
    assert_eq!(supplier_now.address_id, supplier.address_id);

    cleanup_database(&pool).await;
    pool.close().await;
}
