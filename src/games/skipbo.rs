/*
Game: Skip-Bo (2-player strategy simulation)
Stack-elimination card game: empty your 30-card stockpile onto four
shared ascending build piles before your opponent does.
*/

use enum_iterator::Sequence;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const STOCKPILE_SIZE: usize = 30; // 2-player game
pub const BUILD_PILE_COUNT: usize = 4;
pub const DISCARD_PILE_COUNT: usize = 4;
pub const HAND_SIZE: usize = 5;
pub const WILD_COUNT: usize = 18;
pub const DECK_SIZE: usize = 162;
// Bounds runaway games caused by card scarcity; reaching it is a tie
pub const MAX_TURNS: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Card {
    Wild,
    Number(i32),
}

impl Card {
    /// Whether this card can be placed on a pile requiring `required`.
    pub fn fits(&self, required: i32) -> bool {
        match self {
            Card::Wild => required <= 12,
            Card::Number(v) => *v == required,
        }
    }

    pub fn is_wild(&self) -> bool {
        matches!(self, Card::Wild)
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            Card::Wild => None,
            Card::Number(v) => Some(*v),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Sequence, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    #[default]
    Optimiert,
    Zufall,
    Spontan,
    Fortgeschritten,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Optimiert => "Optimiert",
            Strategy::Zufall => "Zufall",
            Strategy::Spontan => "Spontan",
            Strategy::Fortgeschritten => "Fortgeschritten",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveSource {
    Stockpile,
    Hand,
    Discard(usize),
}

/// A candidate play: which card to take from where, optionally onto a
/// specific build pile. `priority` only ranks candidates within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOption {
    pub source: MoveSource,
    pub card: Card,
    pub target: Option<usize>,
    pub priority: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Info,
    Warn,
    Success,
    Start,
    Turn,
    Reset,
}

/// Where move-by-move log lines go. Replacing the sink never changes game
/// outcomes: no RNG is consumed and no state is read when emitting.
pub trait EventSink {
    fn emit(&mut self, kind: EventKind, message: &str);
}

/// Sink that drops everything, for silent batch runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _kind: EventKind, _message: &str) {}
}

/// Adapter so any closure can serve as a sink.
pub struct FnSink<F>(pub F);

impl<F: FnMut(EventKind, &str)> EventSink for FnSink<F> {
    fn emit(&mut self, kind: EventKind, message: &str) {
        (self.0)(kind, message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: usize,
    pub strategy: Strategy,
    pub stockpile: Vec<Card>,
    pub hand: Vec<Card>,
    pub discard_piles: [Vec<Card>; DISCARD_PILE_COUNT],
}

impl PlayerState {
    fn new(id: usize, strategy: Strategy) -> Self {
        Self {
            id,
            strategy,
            stockpile: vec![],
            hand: vec![],
            discard_piles: Default::default(),
        }
    }

    pub fn name(&self) -> String {
        format!("Spieler {}", self.id + 1)
    }

    /// Top of the stockpile (last element), if any.
    pub fn top_stockpile(&self) -> Option<Card> {
        self.stockpile.last().copied()
    }

    pub fn top_discard(&self, pile: usize) -> Option<Card> {
        self.discard_piles[pile].last().copied()
    }
}

/// Outcome of one simulated game. Immutable once produced; the runner owns
/// the collected results afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Option<usize>,
    pub winner_strategy: Option<Strategy>,
    pub turns: i32,
    pub duration_ms: u64,
    pub starter: usize,
    pub wilds_played: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipBoGame {
    pub players: [PlayerState; 2],
    pub draw_pile: Vec<Card>,
    // Completed build piles land here until the draw pile runs dry
    pub scrap: Vec<Card>,
    pub build_piles: [Vec<i32>; BUILD_PILE_COUNT],
    pub current_player: usize,
    pub turn_count: i32,
    pub wilds_played: i32,
    pub winner: Option<usize>,
}

impl SkipBoGame {
    pub fn new(strategy_p1: Strategy, strategy_p2: Strategy) -> Self {
        Self {
            players: [
                PlayerState::new(0, strategy_p1),
                PlayerState::new(1, strategy_p2),
            ],
            draw_pile: vec![],
            scrap: vec![],
            build_piles: Default::default(),
            current_player: 0,
            turn_count: 0,
            wilds_played: 0,
            winner: None,
        }
    }

    /// The fixed 162-card deck: 12 copies of each value 1-12 plus 18 wilds.
    pub fn deck() -> Vec<Card> {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for _ in 0..12 {
            for value in 1..=12 {
                cards.push(Card::Number(value));
            }
        }
        for _ in 0..WILD_COUNT {
            cards.push(Card::Wild);
        }
        cards
    }

    /// Shuffles a fresh deck and hands out stockpiles; everything else is
    /// reset to its start-of-game state.
    pub fn deal(&mut self, rng: &mut impl Rng) {
        let mut cards = Self::deck();
        cards.shuffle(rng);
        for player in self.players.iter_mut() {
            player.stockpile = cards.drain(..STOCKPILE_SIZE).collect();
            player.hand = vec![];
            player.discard_piles = Default::default();
        }
        self.draw_pile = cards;
        self.scrap = vec![];
        self.build_piles = Default::default();
        self.current_player = 0;
        self.turn_count = 0;
        self.wilds_played = 0;
        self.winner = None;
    }

    /// Next value each build pile accepts (1 when empty).
    pub fn required_values(&self) -> [i32; BUILD_PILE_COUNT] {
        let mut required = [1; BUILD_PILE_COUNT];
        for (i, pile) in self.build_piles.iter().enumerate() {
            if let Some(top) = pile.last() {
                required[i] = top + 1;
            }
        }
        required
    }

    fn refill_draw_pile(&mut self, rng: &mut impl Rng, sink: &mut dyn EventSink) {
        if self.draw_pile.is_empty() && !self.scrap.is_empty() {
            std::mem::swap(&mut self.draw_pile, &mut self.scrap);
            self.draw_pile.shuffle(rng);
            sink.emit(
                EventKind::Info,
                "Draw pile rebuilt from the completed-pile scrap.",
            );
        }
    }

    /// Tops up the player's hand to five cards. Running out of cards in both
    /// the draw pile and the scrap is legal; the hand just stays short.
    pub fn draw_up_to_hand_size(
        &mut self,
        player: usize,
        rng: &mut impl Rng,
        sink: &mut dyn EventSink,
    ) {
        while self.players[player].hand.len() < HAND_SIZE {
            if self.draw_pile.is_empty() {
                self.refill_draw_pile(rng, sink);
            }
            match self.draw_pile.pop() {
                Some(card) => self.players[player].hand.push(card),
                None => break,
            }
        }
    }

    /// Places `card` on build pile `pile` if it fits. Wilds resolve to the
    /// required value; a resolved 12 clears the pile into the scrap.
    pub fn play_card_to_build_pile(
        &mut self,
        card: Card,
        pile: usize,
        sink: &mut dyn EventSink,
    ) -> bool {
        let required = self.required_values()[pile];
        if !card.fits(required) {
            return false;
        }
        self.build_piles[pile].push(required);
        if card.is_wild() {
            self.wilds_played += 1;
        }
        if required == 12 {
            // Wilds recycle as the number they resolved to
            let completed = std::mem::take(&mut self.build_piles[pile]);
            self.scrap.extend(completed.into_iter().map(Card::Number));
            sink.emit(EventKind::Success, &format!("Build pile {} completed!", pile + 1));
        }
        true
    }

    /// Applies a proposed move: plays the card onto the declared target pile
    /// (or the first pile that accepts it), then removes it from its source.
    /// Emptying the stockpile wins the game on the spot.
    pub fn apply_move(
        &mut self,
        player: usize,
        mov: &MoveOption,
        sink: &mut dyn EventSink,
    ) -> bool {
        let piles: Vec<usize> = match mov.target {
            Some(pile) => vec![pile],
            None => (0..BUILD_PILE_COUNT).collect(),
        };
        for pile in piles {
            if !self.play_card_to_build_pile(mov.card, pile, sink) {
                continue;
            }
            let name = self.players[player].name();
            match mov.source {
                MoveSource::Stockpile => {
                    self.players[player].stockpile.pop();
                    sink.emit(
                        EventKind::Info,
                        &format!(
                            "{}: stockpile ({} left) played to build pile {}.",
                            name,
                            self.players[player].stockpile.len(),
                            pile + 1
                        ),
                    );
                    if self.players[player].stockpile.is_empty() {
                        sink.emit(EventKind::Success, &format!("{} emptied the stockpile!", name));
                        self.winner = Some(player);
                    }
                }
                MoveSource::Discard(discard_pile) => {
                    self.players[player].discard_piles[discard_pile].pop();
                    sink.emit(
                        EventKind::Info,
                        &format!(
                            "{}: discard pile {} played to build pile {}.",
                            name,
                            discard_pile + 1,
                            pile + 1
                        ),
                    );
                }
                MoveSource::Hand => {
                    let hand = &mut self.players[player].hand;
                    if let Some(index) = hand.iter().position(|c| *c == mov.card) {
                        hand.remove(index);
                        sink.emit(
                            EventKind::Info,
                            &format!("{}: hand card played to build pile {}.", name, pile + 1),
                        );
                    }
                }
            }
            return true;
        }
        false
    }

    /// One full turn for the active player: draw, play until no move is
    /// proposed (or the game is won), then the end-of-turn discard.
    fn player_turn(&mut self, rng: &mut impl Rng, sink: &mut dyn EventSink) {
        let player = self.current_player;
        self.draw_up_to_hand_size(player, rng, sink);

        while self.winner.is_none() {
            let Some(mov) = self.propose_play(player, rng) else {
                break;
            };
            // A proposal apply_move rejects is a defect in the enumeration;
            // fall through to the discard phase rather than aborting the batch.
            if !self.apply_move(player, &mov, sink) {
                sink.emit(
                    EventKind::Warn,
                    &format!("{}: proposed move was not playable.", self.players[player].name()),
                );
                break;
            }
        }

        if self.winner.is_none() {
            self.discard_phase(player, rng, sink);
        }
    }

    fn discard_phase(&mut self, player: usize, rng: &mut impl Rng, sink: &mut dyn EventSink) {
        match self.propose_discard(player, rng) {
            Some((hand_index, pile)) => {
                let card = self.players[player].hand.remove(hand_index);
                self.players[player].discard_piles[pile].push(card);
                sink.emit(
                    EventKind::Info,
                    &format!(
                        "{} ends the turn discarding onto pile {}.",
                        self.players[player].name(),
                        pile + 1
                    ),
                );
            }
            None => {
                sink.emit(
                    EventKind::Warn,
                    &format!(
                        "{} had no hand card to discard. Turn over.",
                        self.players[player].name()
                    ),
                );
            }
        }
    }

    /// Runs a complete game to a winner or the turn-limit tie.
    pub fn run(&mut self, rng: &mut impl Rng, sink: &mut dyn EventSink) -> GameResult {
        let start = Instant::now();
        self.deal(rng);

        while self.winner.is_none() && self.turn_count < MAX_TURNS {
            self.turn_count += 1;
            sink.emit(
                EventKind::Turn,
                &format!(
                    "Turn {}: {} to move.",
                    self.turn_count,
                    self.players[self.current_player].name()
                ),
            );
            self.player_turn(rng, sink);
            if self.winner.is_some() {
                break;
            }
            self.current_player = 1 - self.current_player;
        }

        GameResult {
            winner: self.winner,
            winner_strategy: self.winner.map(|w| self.players[w].strategy),
            turns: self.turn_count,
            duration_ms: start.elapsed().as_millis() as u64,
            starter: 0,
            wilds_played: self.wilds_played,
        }
    }

    /// Total cards across every pile and hand; the game never creates or
    /// destroys cards, so this is 162 between operations.
    pub fn total_cards(&self) -> usize {
        let mut total = self.draw_pile.len() + self.scrap.len();
        for pile in self.build_piles.iter() {
            total += pile.len();
        }
        for player in self.players.iter() {
            total += player.stockpile.len() + player.hand.len();
            for pile in player.discard_piles.iter() {
                total += pile.len();
            }
        }
        total
    }

    // --- Strategy engine ---

    /// Asks the active player's strategy for its next play, or None when the
    /// player passes to the discard phase.
    pub fn propose_play(&self, player: usize, rng: &mut impl Rng) -> Option<MoveOption> {
        match self.players[player].strategy {
            Strategy::Optimiert => self.propose_play_optimiert(player),
            Strategy::Spontan => self.propose_play_spontan(player),
            Strategy::Zufall => self.propose_play_zufall(player, rng),
            Strategy::Fortgeschritten => self.propose_play_fortgeschritten(player),
        }
    }

    /// Stockpile plays are forced for every strategy: if the top stockpile
    /// card fits any build pile it is played before anything else.
    fn forced_stockpile_play(&self, player: usize) -> Option<MoveOption> {
        let top = self.players[player].top_stockpile()?;
        let required = self.required_values();
        for pile in 0..BUILD_PILE_COUNT {
            if top.fits(required[pile]) {
                return Some(MoveOption {
                    source: MoveSource::Stockpile,
                    card: top,
                    target: None,
                    priority: i32::MAX,
                });
            }
        }
        None
    }

    /// Numbered-card candidates from hand and discard tops, one per
    /// (card, matching pile) pair, scored by the given priority functions.
    fn numbered_candidates(
        &self,
        player: usize,
        hand_priority: impl Fn(i32) -> i32,
        discard_priority: impl Fn(i32) -> i32,
    ) -> Vec<MoveOption> {
        let required = self.required_values();
        let mut candidates = vec![];
        for card in self.players[player].hand.iter() {
            let Some(value) = card.value() else { continue };
            for req in required.iter() {
                if value == *req {
                    candidates.push(MoveOption {
                        source: MoveSource::Hand,
                        card: *card,
                        target: None,
                        priority: hand_priority(value),
                    });
                }
            }
        }
        for pile in 0..DISCARD_PILE_COUNT {
            let Some(card) = self.players[player].top_discard(pile) else {
                continue;
            };
            let Some(value) = card.value() else { continue };
            for req in required.iter() {
                if value == *req {
                    candidates.push(MoveOption {
                        source: MoveSource::Discard(pile),
                        card,
                        target: None,
                        priority: discard_priority(value),
                    });
                }
            }
        }
        candidates
    }

    /// First candidate with the strictly highest priority, preserving
    /// enumeration order on ties.
    fn best_candidate(candidates: Vec<MoveOption>) -> Option<MoveOption> {
        let mut best: Option<MoveOption> = None;
        for candidate in candidates {
            if best.map_or(true, |b| candidate.priority > b.priority) {
                best = Some(candidate);
            }
        }
        best
    }

    fn propose_play_optimiert(&self, player: usize) -> Option<MoveOption> {
        if let Some(mov) = self.forced_stockpile_play(player) {
            return Some(mov);
        }

        // Lowest numbered card first; the discard offset makes an equal-value
        // hand card beat the discard-pile copy.
        let mut candidates =
            self.numbered_candidates(player, |v| 1000 - v * 10, |v| 1000 - v * 10 - 5);

        let required = self.required_values();
        let stock_top = self.players[player].top_stockpile();
        if self.players[player].hand.contains(&Card::Wild) {
            for req in required.iter() {
                // Wilds are only spent to complete a pile or to match the
                // stockpile top. A wild atop the stockpile itself never
                // reaches this scan; the forced stockpile check plays it.
                let strategic = *req == 12 || stock_top.and_then(|c| c.value()) == Some(*req);
                if strategic {
                    candidates.push(MoveOption {
                        source: MoveSource::Hand,
                        card: Card::Wild,
                        target: None,
                        priority: 5000 + req,
                    });
                }
            }
        }
        Self::best_candidate(candidates)
    }

    fn propose_play_spontan(&self, player: usize) -> Option<MoveOption> {
        if let Some(mov) = self.forced_stockpile_play(player) {
            return Some(mov);
        }
        // Flat tiers: wild > hand > discard, first found within a tier.
        let mut candidates = vec![];
        if self.players[player].hand.contains(&Card::Wild) {
            candidates.push(MoveOption {
                source: MoveSource::Hand,
                card: Card::Wild,
                target: None,
                priority: 300,
            });
        }
        candidates.extend(self.numbered_candidates(player, |_| 200, |_| 100));
        Self::best_candidate(candidates)
    }

    fn propose_play_zufall(&self, player: usize, rng: &mut impl Rng) -> Option<MoveOption> {
        if let Some(mov) = self.forced_stockpile_play(player) {
            return Some(mov);
        }
        let mut candidates = self.numbered_candidates(player, |_| 0, |_| 0);
        if self.players[player].hand.contains(&Card::Wild) {
            // One entry per build pile, matching the weight numbered cards get
            for _ in self.required_values() {
                candidates.push(MoveOption {
                    source: MoveSource::Hand,
                    card: Card::Wild,
                    target: None,
                    priority: 0,
                });
            }
        }
        candidates.choose(rng).copied()
    }

    /// Every legal (source, card, build pile) combination, ranked:
    /// stockpile over hand over discard, numbers over wilds inside a tier,
    /// then lower values first.
    fn enumerate_all_moves(&self, player: usize) -> Vec<MoveOption> {
        let required = self.required_values();
        let state = &self.players[player];
        let mut moves = vec![];
        let mut push = |source: MoveSource, card: Card, pile: usize, tier: i32| {
            if !card.fits(required[pile]) {
                return;
            }
            let wild_penalty = if card.is_wild() { 100 } else { 0 };
            let value = card.value().unwrap_or(required[pile]);
            moves.push(MoveOption {
                source,
                card,
                target: Some(pile),
                priority: tier * 1000 - wild_penalty - value,
            });
        };
        for pile in 0..BUILD_PILE_COUNT {
            if let Some(card) = state.top_stockpile() {
                push(MoveSource::Stockpile, card, pile, 3);
            }
            for card in state.hand.iter() {
                push(MoveSource::Hand, *card, pile, 2);
            }
            for discard_pile in 0..DISCARD_PILE_COUNT {
                if let Some(card) = state.top_discard(discard_pile) {
                    push(MoveSource::Discard(discard_pile), card, pile, 1);
                }
            }
        }
        moves
    }

    fn propose_play_fortgeschritten(&self, player: usize) -> Option<MoveOption> {
        // Re-enumerates from scratch on every call, so the play loop walks
        // the entire ranked move list until nothing is left.
        Self::best_candidate(self.enumerate_all_moves(player))
    }

    /// End-of-turn discard: which hand card goes onto which discard pile.
    pub fn propose_discard(&self, player: usize, rng: &mut impl Rng) -> Option<(usize, usize)> {
        let state = &self.players[player];
        if state.hand.is_empty() {
            return None;
        }
        match state.strategy {
            Strategy::Optimiert => Some(self.discard_optimiert(player)),
            Strategy::Spontan => Some((0, rng.gen_range(0..DISCARD_PILE_COUNT))),
            Strategy::Zufall => Some((
                rng.gen_range(0..state.hand.len()),
                rng.gen_range(0..DISCARD_PILE_COUNT),
            )),
            Strategy::Fortgeschritten => Some(self.discard_fortgeschritten(player)),
        }
    }

    /// Bury the highest non-wild card on the pile with the lowest top card.
    fn discard_optimiert(&self, player: usize) -> (usize, usize) {
        let state = &self.players[player];
        let mut chosen = 0;
        let mut chosen_value = -1;
        for (index, card) in state.hand.iter().enumerate() {
            if let Some(value) = card.value() {
                if value > chosen_value {
                    chosen = index;
                    chosen_value = value;
                }
            }
        }
        // chosen stays 0 when the hand is all wilds

        let mut pile = 0;
        let mut lowest_top = i32::MAX;
        for (index, discard) in state.discard_piles.iter().enumerate() {
            let top = discard.last().and_then(|c| c.value()).unwrap_or(0);
            if top < lowest_top {
                lowest_top = top;
                pile = index;
            }
        }
        (chosen, pile)
    }

    /// Score hand cards for keeping vs. dumping: high cards go, low cards
    /// stay, and a card matching the stockpile top is never thrown away.
    fn discard_fortgeschritten(&self, player: usize) -> (usize, usize) {
        let state = &self.players[player];
        let stock_top = state.top_stockpile().and_then(|c| c.value());
        let mut chosen: Option<(usize, i32)> = None;
        for (index, card) in state.hand.iter().enumerate() {
            let Some(value) = card.value() else { continue };
            let mut score = 0;
            if value >= 10 {
                score += 50;
            } else if value >= 7 {
                score += 20;
            }
            if value <= 3 {
                score -= 30;
            }
            if stock_top == Some(value) {
                score -= 100;
            }
            if chosen.map_or(true, |(_, best)| score > best) {
                chosen = Some((index, score));
            }
        }
        let card_index = chosen.map(|(index, _)| index).unwrap_or(0);

        let mut pile: Option<usize> = None;
        let mut highest_top = -1;
        for (index, discard) in state.discard_piles.iter().enumerate() {
            if let Some(top) = discard.last().and_then(|c| c.value()) {
                if top < 12 && top > highest_top {
                    highest_top = top;
                    pile = Some(index);
                }
            }
        }
        let pile = pile
            .or_else(|| state.discard_piles.iter().position(|p| p.is_empty()))
            .unwrap_or(0);
        (card_index, pile)
    }
}
