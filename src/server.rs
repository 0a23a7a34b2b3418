use pixeldeck_common::Deck;
use rouille::{Request, Response};
use std::sync::{Mutex, PoisonError};

const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Credentials", "true"),
    (
        "Access-Control-Allow-Methods",
        "POST, GET, OPTIONS, PUT, DELETE",
    ),
    (
        "Access-Control-Allow-Headers",
        "DNT, Access-Control-Allow-Headers, Origin, X-Requested-With, \
         Access-Control-Request-Method, Access-Control-Request-Headers, Accept, \
         Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization",
    ),
];

fn with_cors(response: Response) -> Response {
    CORS_HEADERS
        .into_iter()
        .fold(response, |response, (name, value)| {
            response.with_additional_header(name, value)
        })
}

/// Deals pixels to drawing clients
///
/// Owns the deck; each `GET /Pixel` takes the lock once, so concurrent requests
/// never see the same pixel twice within a pass.
pub struct PixelService {
    deck: Mutex<Deck>,
}

impl PixelService {
    pub fn new(deck: Deck) -> Self {
        Self {
            deck: Mutex::new(deck),
        }
    }

    pub fn handle(&self, request: &Request) -> Response {
        // preflight never reaches the router
        if request.method() == "OPTIONS" {
            return with_cors(Response::text(""));
        }

        let response = rouille::router!(request,
            (GET) ["/"] => {
                Response::text("Why are you here?")
            },
            (GET) ["/Pixel"] => {
                self.deal()
            },
            _ => Response::empty_404()
        );

        with_cors(response)
    }

    fn deal(&self) -> Response {
        let mut deck = self.deck.lock().unwrap_or_else(PoisonError::into_inner);

        let pixel = match deck.deal() {
            Ok(pixel) => pixel,
            Err(error) => {
                warn!(%error, "refusing to deal");
                return Response::text(error.to_string()).with_status_code(404);
            }
        };

        info!(x = pixel.x, y = pixel.y, color = %pixel.color, "placing pixel");

        match serde_json::to_string(pixel) {
            Ok(body) => Response::from_data("application/json", body),
            Err(error) => {
                error!(?error, "failed to encode pixel");
                Response::text("internal error").with_status_code(500)
            }
        }
    }
}
