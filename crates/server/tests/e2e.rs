use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::Value;
use service::image_url::ImageUrls;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use server::routes::{self, ServerState};
use server::startup::{build_cors, serve};

struct TestApp {
    base_url: String,
    uploads_dir: PathBuf,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<anyhow::Result<()>>,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // 每个测试独立的内存数据库与上传目录
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;

    let uploads_dir = std::env::temp_dir().join(format!("ecoleta-e2e-{}", Uuid::new_v4()));
    common::env::ensure_uploads_dir(&uploads_dir).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let state = ServerState::new(db, ImageUrls::new(base_url.clone()), &uploads_dir);
    let app: Router = routes::build_router(state, build_cors(), 1024 * 1024);

    let (shutdown, rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, app, async move {
        let _ = rx.await;
    }));

    Ok(TestApp { base_url, uploads_dir, shutdown, server })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn point_form(name: &str, city: &str, uf: &str, items: &str) -> anyhow::Result<Form> {
    let image = Part::bytes(b"\xff\xd8\xff\xe0fake-jpeg".to_vec())
        .file_name("photo.jpg")
        .mime_str("image/jpeg")?;
    Ok(Form::new()
        .text("name", name.to_string())
        .text("email", "contato@ecoponto.com")
        .text("whatsapp", "41999990000")
        .text("latitude", "-25.4284")
        .text("longitude", "-49.2733")
        .text("city", city.to_string())
        .text("uf", uf.to_string())
        .text("items", items.to_string())
        .part("image", image))
}

/// Stored point images, i.e. everything except the bundled item icons.
async fn uploads_in(dir: &Path) -> anyhow::Result<usize> {
    let icons: Vec<&str> = common::env::ITEM_ASSETS.iter().map(|(name, _)| *name).collect();
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut n = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !icons.contains(&entry.file_name().to_string_lossy().as_ref()) {
            n += 1;
        }
    }
    Ok(n)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_items_catalog() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/items", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let items = res.json::<Vec<Value>>().await?;
    assert_eq!(items.len(), 6);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["title"], "Lâmpadas");
    assert_eq!(items[0]["image_url"], format!("{}/uploads/lampadas.svg", app.base_url));

    // 每个 item 的图标都能通过 image_url 取到
    for item in &items {
        let url = item["image_url"].as_str().expect("image_url");
        let icon = client().get(url).send().await?;
        assert_eq!(icon.status(), HttpStatusCode::OK, "{url}");
        assert!(icon.text().await?.starts_with("<svg"), "{url}");
    }
    Ok(())
}

#[tokio::test]
async fn e2e_create_then_list_and_show() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/points", app.base_url))
        .multipart(point_form("EcoPonto A", "Curitiba", "PR", "1,2")?)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let created = res.json::<Value>().await?;
    let id = created["id"].as_i64().expect("assigned id");
    let image = created["image"].as_str().expect("stored image").to_string();
    assert!(image.ends_with("-photo.jpg"));
    assert_eq!(created["name"], "EcoPonto A");
    assert_eq!(created["latitude"], -25.4284);

    // 列表：按城市、州与 item 过滤
    let listed = c
        .get(format!("{}/points", app.base_url))
        .query(&[("city", "Curitiba"), ("uf", "PR"), ("items", "2")])
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id);
    let image_url = listed[0]["image_url"].as_str().expect("image_url").to_string();
    assert_eq!(image_url, format!("{}/uploads/{}", app.base_url, image));

    let detail = c.get(format!("{}/points/{}", app.base_url, id)).send().await?;
    assert_eq!(detail.status(), HttpStatusCode::OK);
    let detail = detail.json::<Value>().await?;
    assert_eq!(detail["point"]["id"], id);
    assert_eq!(detail["point"]["image_url"], image_url.as_str());
    assert_eq!(
        detail["items"],
        serde_json::json!([{"title": "Lâmpadas"}, {"title": "Pilhas e Baterias"}])
    );

    // 上传的图片可通过 image_url 访问
    let file = c.get(&image_url).send().await?;
    assert_eq!(file.status(), HttpStatusCode::OK);
    assert_eq!(file.bytes().await?.as_ref(), b"\xff\xd8\xff\xe0fake-jpeg");
    Ok(())
}

#[tokio::test]
async fn e2e_list_is_distinct_and_filtered() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for (name, city, uf, items) in [("A", "Curitiba", "PR", "1,2,3"), ("B", "Curitiba", "SC", "1"), ("C", "Curitiba", "PR", "5")] {
        let res = c.post(format!("{}/points", app.base_url)).multipart(point_form(name, city, uf, items)?).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
    }

    let listed = c
        .get(format!("{}/points?city=Curitiba&uf=PR&items=1,2,3", app.base_url))
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "A");

    let none = c
        .get(format!("{}/points?city=Curitiba&uf=PR", app.base_url))
        .send()
        .await?;
    assert_eq!(none.status(), HttpStatusCode::OK);
    assert_eq!(none.json::<Vec<Value>>().await?.len(), 0);
    Ok(())
}

#[tokio::test]
async fn e2e_show_missing_point() -> anyhow::Result<()> {
    let app = start_server().await?;
    for id in ["12345", "abc"] {
        let res = client().get(format!("{}/points/{}", app.base_url, id)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
        let body = res.json::<Value>().await?;
        assert_eq!(body, serde_json::json!({"message": "Point not found"}));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_failed_create_leaves_nothing_behind() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/points", app.base_url))
        .multipart(point_form("Ghost", "Curitiba", "PR", "1,999")?)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Create Failed");

    let listed = c
        .get(format!("{}/points?city=Curitiba&uf=PR&items=1", app.base_url))
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert!(listed.is_empty());
    assert_eq!(uploads_in(&app.uploads_dir).await?, 0);

    let res = c
        .post(format!("{}/points", app.base_url))
        .multipart(point_form("Ghost", "Curitiba", "PR", "1,abc")?)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);

    // 失败不影响后续创建
    let res = c
        .post(format!("{}/points", app.base_url))
        .multipart(point_form("Real", "Curitiba", "PR", "1")?)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let detail = c.get(format!("{}/points/{}", app.base_url, res.json::<Value>().await?["id"])).send().await?;
    assert_eq!(detail.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_create_rejects_malformed_form() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let no_image = Form::new().text("name", "A").text("items", "1");
    let res = c.post(format!("{}/points", app.base_url)).multipart(no_image).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "image is required");

    let bad_latitude = point_form("A", "Curitiba", "PR", "1")?.text("latitude", "north");
    let res = c.post(format!("{}/points", app.base_url)).multipart(bad_latitude).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(uploads_in(&app.uploads_dir).await?, 0);
    Ok(())
}

#[tokio::test]
async fn e2e_shutdown_signal_stops_server() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["status"], "ok");

    let _ = app.shutdown.send(());
    let stopped = tokio::time::timeout(std::time::Duration::from_secs(5), app.server).await?;
    stopped??;

    assert!(client().get(format!("{}/health", app.base_url)).send().await.is_err());
    Ok(())
}
