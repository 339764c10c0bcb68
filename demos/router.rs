use switchyard::{
	hyper::{Body, Server},
	route, FileSystem, HttpRouter, Params, Request, Response, ResponseBuilder, RouterBuilder, RouterConfig,
};

async fn handler(_req: Request, params: Params) -> anyhow::Result<hyper::Response<Body>> {
	let res = ResponseBuilder::default();
	dbg!(params.iter().collect::<Vec<_>>());
	Ok(res.body(Body::empty())?)
}

async fn other_handler(_req: Request, params: Params) -> anyhow::Result<hyper::Response<Body>> {
	let res = ResponseBuilder::default();
	Ok(res.body(format!("page {}", params.by_name("page")).into())?)
}

struct Listing;

impl FileSystem for Listing {
	fn serve(&self, req: Request) -> Response {
		let body = format!("would serve {}", req.uri().path());
		Box::pin(async move { Ok(hyper::Response::new(Body::from(body))) })
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let addr = ([127, 0, 0, 1], 3000).into();

	let config = match std::env::args().nth(1) {
		Some(path) => RouterConfig::load(path)?,
		None => RouterConfig::default(),
	};

	let mut builder = RouterBuilder::new(config);
	builder
		.get("/", route(handler))?
		.post("/foo/:a/bar/:b/baz", route(handler))?
		.get("/:page", route(other_handler))?
		.serve_files("/static/*filepath", Listing)?;

	let router = HttpRouter::from(builder);

	let server = Server::bind(&addr).serve(router);
	println!("Listening on http://{}", addr);

	server.await?;
	Ok(())
}
