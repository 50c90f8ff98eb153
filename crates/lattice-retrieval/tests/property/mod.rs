mod prop_ranking;
