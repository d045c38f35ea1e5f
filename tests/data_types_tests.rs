use std::collections::HashMap;

use memo_cache::Cache;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: String,
    name: String,
    price: f64,
    in_stock: bool,
}

#[tokio::test]
async fn test_string_keys() {
    let cache = Cache::new(|key: String| {
        Box::pin(async move { Ok(format!("processed_{}", key.to_uppercase())) })
    });

    let result = cache.get("hello".to_string()).await.unwrap();
    assert_eq!(result, "processed_HELLO");
}

#[tokio::test]
async fn test_struct_values() {
    let cache = Cache::new(|user_id: u32| {
        Box::pin(async move {
            let user = User {
                id: user_id,
                name: format!("User{}", user_id),
                email: format!("user{}@example.com", user_id),
            };
            Ok(user)
        })
    });

    let user = cache.get(123).await.unwrap();
    assert_eq!(user.id, 123);
    assert_eq!(user.name, "User123");
    assert_eq!(user.email, "user123@example.com");
}

#[tokio::test]
async fn test_vec_values() {
    let cache = Cache::new(|count: usize| {
        Box::pin(async move {
            let numbers: Vec<i32> = (0..count as i32).collect();
            Ok(numbers)
        })
    });

    let numbers = cache.get(5).await.unwrap();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_hashmap_values() {
    let cache = Cache::new(|category: String| {
        Box::pin(async move {
            let mut products = HashMap::new();
            products.insert(
                "prod1".to_string(),
                Product {
                    id: "prod1".to_string(),
                    name: format!("{} Product 1", category),
                    price: 99.99,
                    in_stock: true,
                },
            );
            products.insert(
                "prod2".to_string(),
                Product {
                    id: "prod2".to_string(),
                    name: format!("{} Product 2", category),
                    price: 149.99,
                    in_stock: false,
                },
            );
            Ok(products)
        })
    });

    let products = cache.get("Electronics".to_string()).await.unwrap();
    assert_eq!(products.len(), 2);
    assert!(products.contains_key("prod1"));
    assert_eq!(products["prod1"].name, "Electronics Product 1");
}

#[tokio::test]
async fn test_tuple_keys() {
    let cache = Cache::new(|key: (String, u32)| {
        Box::pin(async move {
            let (category, page) = key;
            Ok(format!("{}:page{}", category, page))
        })
    });

    let result = cache.get(("products".to_string(), 2)).await.unwrap();
    assert_eq!(result, "products:page2");
}

#[tokio::test]
async fn test_option_values() {
    let cache = Cache::new(|key: i32| {
        Box::pin(async move {
            let value = if key % 2 == 0 {
                Some(format!("even_{}", key))
            } else {
                None
            };
            Ok(value)
        })
    });

    let even_result = cache.get(4).await.unwrap();
    assert_eq!(even_result, Some("even_4".to_string()));

    let odd_result = cache.get(3).await.unwrap();
    assert_eq!(odd_result, None);
}

#[tokio::test]
async fn test_arc_values_share_one_allocation() {
    use std::sync::Arc;

    let cache = Cache::new(|count: usize| {
        Box::pin(async move {
            let blob: Arc<Vec<u8>> = Arc::new(vec![0u8; count]);
            Ok(blob)
        })
    });

    let first = cache.get(1024).await.unwrap();
    let second = cache.get(1024).await.unwrap();

    assert_eq!(first.len(), 1024);
    assert!(Arc::ptr_eq(&first, &second));
}
