//! Netparse MCP Server
//!
//! Exposes the netparse functions as MCP tools over stdio. Results are
//! returned as JSON text; rejected inputs become tool errors carrying the
//! parser's message. Logs go to stderr since stdout carries the protocol.

use netparse_lib::functions::{self, Argument, Invocation};
use netparse_lib::{load_env_config, DomainParser};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DomainRequest {
    /// The host that identifies the domain name
    pub host: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UrlRequest {
    /// The URL to parse
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CidrRequest {
    /// The IP address and prefix length in CIDR notation
    pub cidr: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ContainsRequest {
    /// The network in CIDR notation
    pub network: Option<String>,
    /// The IP address to check
    pub ip: Option<String>,
}

#[derive(Clone)]
pub struct NetparseServer {
    parser: DomainParser,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl NetparseServer {
    pub fn new(parser: DomainParser) -> Self {
        Self {
            parser,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Parse Public Suffix List properties from a domain: domain, host, manager, sld, subdomain and tld."
    )]
    async fn parse_domain(
        &self,
        Parameters(req): Parameters<DomainRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(functions::PARSE_DOMAIN, vec![req.host.into()]))
    }

    #[tool(
        description = "Parse URL components from a URL string: authority, protocol, scheme, credentials, username, password, host, port, path, search, query, hash and fragment."
    )]
    async fn parse_url(
        &self,
        Parameters(req): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(functions::PARSE_URL, vec![req.url.into()]))
    }

    #[tool(
        description = "Parse an IP address and prefix length in CIDR notation into the address and its network."
    )]
    async fn parse_cidr(
        &self,
        Parameters(req): Parameters<CidrRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(functions::PARSE_CIDR, vec![req.cidr.into()]))
    }

    #[tool(description = "Check if an IP address is within a network.")]
    async fn contains_ip(
        &self,
        Parameters(req): Parameters<ContainsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(
            functions::CONTAINS_IP,
            vec![req.network.into(), req.ip.into()],
        ))
    }
}

impl NetparseServer {
    fn call(&self, name: &str, args: Vec<Argument>) -> CallToolResult {
        match evaluate(&self.parser, name, &args) {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(message) => CallToolResult::error(vec![Content::text(message)]),
        }
    }
}

#[tool_handler]
impl ServerHandler for NetparseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Decompose domains along the Public Suffix List, split URLs into their components, parse CIDR blocks and test network membership."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

/// JSON text of a successful call, or the message of a rejected one.
fn evaluate(parser: &DomainParser, name: &str, args: &[Argument]) -> Result<String, String> {
    match functions::invoke_with(parser, name, args) {
        Ok(Invocation::Value(value)) => {
            debug!(tool = name, "tool call succeeded");
            serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
        }
        // Tool arguments always arrive with concrete values
        Ok(Invocation::Deferred) => Ok("null".to_string()),
        Err(e) if e.is_input_error() => {
            info!(tool = name, error = %e, "tool input rejected");
            Err(e.to_string())
        }
        Err(e) => {
            warn!(tool = name, error = %e, "tool call failed");
            Err(e.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let strict = load_env_config().strict.unwrap_or(false);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        strict, "starting netparse MCP server"
    );

    let service = NetparseServer::new(DomainParser::new().strict(strict))
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| error!(error = %e, "failed to start MCP server"))?;

    service.waiting().await?;
    Ok(())
}
